use thiserror::Error;

/// Failure of a single HTTP attempt. Drives rotation and retry; never shown
/// to end users verbatim.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not connect while requesting {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid proxy {proxy}: {source}")]
    InvalidProxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    /// Classifies a `reqwest` send error for `url`.
    pub(crate) fn from_send(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout {
                url: url.to_owned(),
                source,
            }
        } else if source.is_connect() {
            TransportError::Connect {
                url: url.to_owned(),
                source,
            }
        } else {
            TransportError::Http(source)
        }
    }

    /// `true` when the failure points at the route (proxy or network) rather
    /// than at the target server's answer.
    #[must_use]
    pub fn is_proxy_failure(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::Connect { .. }
                | TransportError::InvalidProxy { .. }
        )
    }

    /// HTTP status carried by the error, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::UnexpectedStatus { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Why a fetch stopped trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhaustion {
    /// Every proxy in the call's working set failed before the retry budget ran out.
    ProxiesExhausted,
    /// The retry budget ran out and the direct, proxy-less attempt failed too.
    DirectFailed,
}

impl std::fmt::Display for Exhaustion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exhaustion::ProxiesExhausted => write!(f, "no proxies left"),
            Exhaustion::DirectFailed => write!(f, "direct fallback failed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("invalid product URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("gave up fetching {url} after {attempts} attempts ({reason}): {last_error}")]
    FetchExhausted {
        url: String,
        attempts: u32,
        reason: Exhaustion,
        #[source]
        last_error: Box<TransportError>,
    },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ScraperError {
    /// Short, localized text safe to show to a chat user.
    ///
    /// Transport details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            ScraperError::InvalidUrl { .. } => "La URL proporcionada no es válida para Amazon.",
            ScraperError::Transport(_) | ScraperError::FetchExhausted { .. } => {
                "No se pudo conectar con Amazon. Inténtalo de nuevo más tarde."
            }
            ScraperError::InvalidSelector { .. } => {
                "Ocurrió un error inesperado al procesar el producto."
            }
        }
    }
}
