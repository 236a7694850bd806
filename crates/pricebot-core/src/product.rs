use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::price::{Extracted, PriceValue};

/// Raw markup retrieved for one product URL. Never cached.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub html: String,
    pub fetched_at: DateTime<Utc>,
}

/// Structured product data extracted from a [`RawPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: Extracted<String>,
    pub price: Extracted<PriceValue>,
    pub extracted_at: DateTime<Utc>,
}

impl ProductInfo {
    /// `true` when at least one field fell back to the sentinel.
    ///
    /// A degraded result means "try again later", never "the value changed".
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.name.is_unavailable() || self.price.is_unavailable()
    }
}

/// One row of price history. Append-only; ordered by `timestamp` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub product_id: i64,
    pub timestamp: DateTime<Utc>,
    pub price: PriceValue,
}

/// A product URL that a chat owner asked the bot to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedProduct {
    pub product_id: i64,
    /// Chat id of the subscriber that receives change notifications.
    pub owner_id: i64,
    /// Canonical product URL.
    pub url: String,
    pub name: String,
}
