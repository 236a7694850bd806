//! End-to-end retrieval: URL in, structured product data out.

use std::time::Duration;

use pricebot_core::{AppConfig, Extracted, PriceValue, ProductInfo, ProxyDescriptor, ValidationMode};

use crate::error::ScraperError;
use crate::extract::ProductExtractor;
use crate::fetcher::{PageSource, RetryingFetcher};
use crate::parse::PriceParser;
use crate::proxy_pool::ProxyPool;
use crate::retry::RetryPolicy;
use crate::url::UrlValidator;
use crate::user_agent::UserAgentRotator;

/// Validates, fetches and extracts a single product page.
///
/// Generic over the [`PageSource`] so tests can swap the network for canned
/// markup.
#[derive(Debug)]
pub struct ProductTracker<S> {
    source: S,
    validator: UrlValidator,
    extractor: ProductExtractor,
}

impl<S: PageSource> ProductTracker<S> {
    pub fn new(source: S, validator: UrlValidator, extractor: ProductExtractor) -> Self {
        Self {
            source,
            validator,
            extractor,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Name and price for the product at `url`.
    ///
    /// Missing fields come back as [`Extracted::Unavailable`]; only invalid
    /// input and retrieval failures are errors.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] before any I/O when `url` is not a
    ///   product page.
    /// - [`ScraperError::FetchExhausted`] once every attempt has failed.
    pub async fn product_info(&self, url: &str) -> Result<ProductInfo, ScraperError> {
        let canonical = self.validator.check(url).await?;
        let page = self.source.fetch_page(&canonical).await?;
        let info = self.extractor.extract(&page.html);

        if info.is_degraded() {
            tracing::warn!(
                url = %canonical,
                name = %info.name,
                price = %info.price,
                "extraction degraded"
            );
        } else {
            tracing::info!(url = %canonical, name = %info.name, price = %info.price, "product extracted");
        }
        Ok(info)
    }

    /// Current price only.
    ///
    /// # Errors
    ///
    /// Same as [`ProductTracker::product_info`].
    pub async fn price(&self, url: &str) -> Result<Extracted<PriceValue>, ScraperError> {
        Ok(self.product_info(url).await?.price)
    }
}

impl ProductTracker<RetryingFetcher> {
    /// Production pipeline wired from configuration and the loaded proxy list.
    ///
    /// # Errors
    ///
    /// Returns an error if a proxy or HTTP client cannot be built.
    pub fn from_config(config: &AppConfig, proxies: Vec<ProxyDescriptor>) -> Result<Self, ScraperError> {
        let user_agents = UserAgentRotator::new(config.user_agents.clone());
        let validator = match config.validation_mode {
            ValidationMode::Syntactic => UrlValidator::syntactic(),
            ValidationMode::Network => UrlValidator::network(
                Duration::from_secs(config.request_timeout_secs),
                user_agents.pick(),
            )?,
        };
        let extractor = ProductExtractor::new(PriceParser::new(config.default_currency.as_str()))?;
        let fetcher = RetryingFetcher::new(
            ProxyPool::new(proxies),
            user_agents,
            RetryPolicy::from_config(config),
        )?;

        tracing::debug!(
            validation_mode = %config.validation_mode,
            max_retries = config.max_retries,
            "product tracker ready"
        );
        Ok(Self::new(fetcher, validator, extractor))
    }
}
