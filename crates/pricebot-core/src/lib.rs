pub mod app_config;
pub mod change;
pub mod config;
pub mod notify;
pub mod price;
pub mod product;
pub mod proxies;
pub mod session;
pub mod store;
pub mod tracked;

pub use app_config::{AppConfig, Environment, ValidationMode};
pub use change::{detect_price_change, PriceCheck};
pub use config::{load_app_config, load_app_config_from_env};
pub use notify::{escape_markdown_v2, format_price_change, Notifier, NotifyError};
pub use price::{Extracted, PriceValue};
pub use product::{PriceSnapshot, ProductInfo, RawPage, TrackedProduct};
pub use proxies::{load_proxies, parse_proxies, ProxiesFile, ProxyDescriptor, ProxyKind};
pub use session::SessionStateStore;
pub use store::{InMemoryPriceStore, PriceStore, StoreError};
pub use tracked::{load_tracked, TrackedEntry, TrackedFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    FileParse(#[source] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
