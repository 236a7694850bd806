//! Randomized browser identities for outbound requests.

use rand::seq::IndexedRandom;

/// Desktop browser strings used when no override is configured.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
];

#[derive(Debug, Clone)]
pub struct UserAgentRotator {
    agents: Vec<String>,
}

impl UserAgentRotator {
    /// Uses `agents`, or [`DEFAULT_USER_AGENTS`] when the list is empty.
    #[must_use]
    pub fn new(agents: Vec<String>) -> Self {
        let agents = if agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|s| (*s).to_owned()).collect()
        } else {
            agents
        };
        Self { agents }
    }

    /// A uniformly random identity for one attempt.
    #[must_use]
    pub fn pick(&self) -> &str {
        self.agents
            .choose(&mut rand::rng())
            .map_or(DEFAULT_USER_AGENTS[0], String::as_str)
    }

    #[must_use]
    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl Default for UserAgentRotator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
