use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Transport spoken by an upstream relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    Http,
    Https,
    Socks5,
}

impl ProxyKind {
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyKind::Http => "http",
            ProxyKind::Https => "https",
            ProxyKind::Socks5 => "socks5",
        }
    }
}

impl std::fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyKind::Http => write!(f, "HTTP"),
            ProxyKind::Https => write!(f, "HTTPS"),
            ProxyKind::Socks5 => write!(f, "SOCKS5"),
        }
    }
}

/// One configured relay: a transport kind plus a bare `host:port` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyDescriptor {
    pub kind: ProxyKind,
    pub address: String,
}

impl ProxyDescriptor {
    #[must_use]
    pub fn new(kind: ProxyKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
        }
    }

    /// Full proxy URL, e.g. `socks5://98.175.31.195:4145`.
    #[must_use]
    pub fn proxy_url(&self) -> String {
        format!("{}://{}", self.kind.scheme(), self.address)
    }
}

impl std::fmt::Display for ProxyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.address)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProxiesFile {
    #[serde(default)]
    pub proxies: Vec<ProxyDescriptor>,
}

/// Load and validate the static proxy list from a YAML file.
///
/// An empty list is valid: the fetcher then goes straight to direct requests.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_proxies(path: &Path) -> Result<ProxiesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_proxies(&content)
}

/// Parse and validate a proxy list from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_proxies(content: &str) -> Result<ProxiesFile, ConfigError> {
    let proxies_file: ProxiesFile =
        serde_yaml::from_str(content).map_err(ConfigError::FileParse)?;

    validate_proxies(&proxies_file)?;

    Ok(proxies_file)
}

fn validate_proxies(proxies_file: &ProxiesFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for proxy in &proxies_file.proxies {
        let address = proxy.address.trim();
        if address.is_empty() {
            return Err(ConfigError::Validation(
                "proxy address must be non-empty".to_string(),
            ));
        }

        if address.contains("://") {
            return Err(ConfigError::Validation(format!(
                "proxy address '{address}' must be host:port; the scheme comes from `kind`"
            )));
        }

        let has_port = address
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !has_port {
            return Err(ConfigError::Validation(format!(
                "proxy address '{address}' is missing a valid port"
            )));
        }

        if !seen.insert((proxy.kind, address.to_string())) {
            return Err(ConfigError::Validation(format!(
                "duplicate proxy: {} {address}",
                proxy.kind
            )));
        }
    }

    Ok(())
}
