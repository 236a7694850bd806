//! Marketplace product-URL validation and canonicalization.
//!
//! Syntactic checks are pure string work and are safe on hot paths such as
//! bulk polling. [`UrlValidator`] optionally adds a network round-trip.

use std::sync::LazyLock;
use std::time::Duration;

use pricebot_core::ValidationMode;
use regex::Regex;
use reqwest::Client;

use crate::error::{ScraperError, TransportError};

/// `scheme://[www.]amazon.<tld>[.<tld>]/[slug/…](dp|gp/product)/<ASIN>[rest]`.
///
/// Capture 1 is the TLD (`es`, `co.uk`), capture 2 the 10-character ASIN.
static PRODUCT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?amazon\.([a-z]{2,3}(?:\.[a-z]{2,3})?)/(?:[^?#\s]*/)?(?:dp|gp/product)/([A-Z0-9]{10})(?:[/?#]\S*)?$",
    )
    .expect("valid product url regex")
});

/// Returns `true` if `url` is a product-detail page on a supported storefront.
#[must_use]
pub fn validate(url: &str) -> bool {
    PRODUCT_URL.is_match(url.trim())
}

/// Returns the product identifier (ASIN) of a valid product URL.
#[must_use]
pub fn extract_asin(url: &str) -> Option<String> {
    PRODUCT_URL
        .captures(url.trim())
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str().to_owned())
}

/// Reduces a product URL to `https://www.amazon.<tld>/dp/<ASIN>`.
///
/// Slugs, tracking query parameters, and fragments are dropped. The output is
/// itself a valid product URL, so `normalize(normalize(x)) == normalize(x)`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `url` is not a product-detail URL.
pub fn normalize(url: &str) -> Result<String, ScraperError> {
    let trimmed = url.trim();
    let caps = PRODUCT_URL
        .captures(trimmed)
        .ok_or_else(|| ScraperError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: "expected an Amazon product page (…/dp/<ASIN>)".to_owned(),
        })?;

    // Both groups are mandatory in the pattern.
    let (Some(tld), Some(asin)) = (caps.get(1), caps.get(2)) else {
        return Err(ScraperError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: "missing marketplace or product identifier".to_owned(),
        });
    };

    Ok(format!(
        "https://www.amazon.{}/dp/{}",
        tld.as_str(),
        asin.as_str()
    ))
}

/// Accepts or rejects product URLs according to a [`ValidationMode`].
#[derive(Debug, Clone)]
pub struct UrlValidator {
    mode: ValidationMode,
    client: Option<Client>,
}

impl UrlValidator {
    /// Pattern-only validation; never performs I/O.
    #[must_use]
    pub fn syntactic() -> Self {
        Self {
            mode: ValidationMode::Syntactic,
            client: None,
        }
    }

    /// Pattern validation followed by a `HEAD` request on the canonical URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the HTTP client cannot be built.
    pub fn network(timeout: Duration, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self {
            mode: ValidationMode::Network,
            client: Some(client),
        })
    }

    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validates `url` and returns its canonical form.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if the shape is wrong, or in network
    ///   mode if the page answers 404/410.
    /// - [`ScraperError::Transport`] in network mode when the check itself fails.
    pub async fn check(&self, url: &str) -> Result<String, ScraperError> {
        let canonical = normalize(url)?;
        if let Some(client) = &self.client {
            check_reachable(client, &canonical).await?;
        }
        Ok(canonical)
    }
}

/// Issues a `HEAD` request and maps the answer onto validation outcomes.
pub(crate) async fn check_reachable(client: &Client, url: &str) -> Result<(), ScraperError> {
    let response = client
        .head(url)
        .send()
        .await
        .map_err(|e| TransportError::from_send(url, e))?;
    let status = response.status();

    if status.is_success() || status.is_redirection() {
        tracing::debug!(url, status = status.as_u16(), "product url reachable");
        return Ok(());
    }

    if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
        return Err(ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: format!("product page answered {}", status.as_u16()),
        });
    }

    Err(TransportError::UnexpectedStatus {
        status: status.as_u16(),
        url: url.to_owned(),
    }
    .into())
}

#[cfg(test)]
#[path = "url_test.rs"]
mod tests;
