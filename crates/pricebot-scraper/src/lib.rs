pub mod error;
pub mod extract;
pub mod fetcher;
pub mod parse;
mod parse_helpers;
pub mod proxy_pool;
pub mod retry;
pub mod tracker;
pub mod url;
pub mod user_agent;

pub use error::{Exhaustion, ScraperError, TransportError};
pub use extract::{default_rules, ExtractionRule, Field, ProductExtractor};
pub use fetcher::{FetchAttempt, PageSource, RetryingFetcher};
pub use parse::PriceParser;
pub use proxy_pool::{ProxyPool, WorkingSet};
pub use retry::RetryPolicy;
pub use tracker::ProductTracker;
pub use url::UrlValidator;
pub use user_agent::{UserAgentRotator, DEFAULT_USER_AGENTS};
