use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How strictly product URLs are checked before they are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Pattern match only. Never touches the network.
    Syntactic,
    /// Pattern match, then a HEAD request against the canonical URL.
    Network,
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationMode::Syntactic => write!(f, "syntactic"),
            ValidationMode::Network => write!(f, "network"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub proxies_path: PathBuf,
    pub tracked_path: PathBuf,
    /// Proxy-backed attempts per fetch before the direct fallback.
    pub max_retries: u32,
    pub retry_delay_min_ms: u64,
    pub retry_delay_max_ms: u64,
    /// Per-attempt connect + read timeout.
    pub request_timeout_secs: u64,
    /// Product checks allowed in flight at once during a polling batch.
    pub concurrency_limit: usize,
    /// ISO 4217 code assumed when a price carries no currency marker.
    pub default_currency: String,
    pub validation_mode: ValidationMode,
    /// Overrides the built-in browser identity list when non-empty.
    pub user_agents: Vec<String>,
}
