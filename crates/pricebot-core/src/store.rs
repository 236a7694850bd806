//! Persistence collaborator for tracked products and their price history.
//!
//! The retrieval layer only ever talks to [`PriceStore`]; the relational
//! backend lives outside this workspace. [`InMemoryPriceStore`] backs the CLI
//! polling loop and the tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::price::PriceValue;
use crate::product::{PriceSnapshot, TrackedProduct};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown product id {0}")]
    UnknownProduct(i64),

    #[error("owner {owner_id} already tracks {url}")]
    AlreadyTracked { owner_id: i64, url: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage operations the price checker depends on.
///
/// Implementations must keep each product's history append-only and return
/// it ordered by timestamp ascending.
pub trait PriceStore: Send + Sync {
    /// Start tracking `url` for `owner_id`, seeding history with `initial_price`.
    fn add_product(
        &self,
        owner_id: i64,
        url: &str,
        name: &str,
        initial_price: Option<PriceValue>,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Returns `true` if a product was removed.
    fn remove_product(
        &self,
        owner_id: i64,
        url: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn products_for_owner(
        &self,
        owner_id: i64,
    ) -> impl Future<Output = Result<Vec<TrackedProduct>, StoreError>> + Send;

    fn tracked_products(&self) -> impl Future<Output = Result<Vec<TrackedProduct>, StoreError>> + Send;

    fn record_price_change(
        &self,
        product_id: i64,
        price: PriceValue,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn last_price(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Option<PriceValue>, StoreError>> + Send;

    fn price_history(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Vec<PriceSnapshot>, StoreError>> + Send;
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    products: BTreeMap<i64, TrackedProduct>,
    history: HashMap<i64, Vec<PriceSnapshot>>,
}

/// Process-local [`PriceStore`]; contents are lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryPriceStore {
    inner: RwLock<Inner>,
}

impl InMemoryPriceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PriceStore for InMemoryPriceStore {
    async fn add_product(
        &self,
        owner_id: i64,
        url: &str,
        name: &str,
        initial_price: Option<PriceValue>,
    ) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;

        if inner
            .products
            .values()
            .any(|p| p.owner_id == owner_id && p.url == url)
        {
            return Err(StoreError::AlreadyTracked {
                owner_id,
                url: url.to_owned(),
            });
        }

        inner.next_id += 1;
        let product_id = inner.next_id;
        inner.products.insert(
            product_id,
            TrackedProduct {
                product_id,
                owner_id,
                url: url.to_owned(),
                name: name.to_owned(),
            },
        );

        let history = inner.history.entry(product_id).or_default();
        if let Some(price) = initial_price {
            history.push(PriceSnapshot {
                product_id,
                timestamp: Utc::now(),
                price,
            });
        }

        tracing::debug!(product_id, owner_id, url, "product added to store");
        Ok(product_id)
    }

    async fn remove_product(&self, owner_id: i64, url: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let found = inner
            .products
            .values()
            .find(|p| p.owner_id == owner_id && p.url == url)
            .map(|p| p.product_id);

        let Some(product_id) = found else {
            return Ok(false);
        };

        inner.products.remove(&product_id);
        inner.history.remove(&product_id);
        Ok(true)
    }

    async fn products_for_owner(&self, owner_id: i64) -> Result<Vec<TrackedProduct>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn tracked_products(&self) -> Result<Vec<TrackedProduct>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.products.values().cloned().collect())
    }

    async fn record_price_change(&self, product_id: i64, price: PriceValue) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.products.contains_key(&product_id) {
            return Err(StoreError::UnknownProduct(product_id));
        }

        let history = inner.history.entry(product_id).or_default();
        // Keep the ascending order even if the wall clock steps backwards.
        let now = Utc::now();
        let timestamp = history
            .last()
            .map_or(now, |last| last.timestamp.max(now));
        history.push(PriceSnapshot {
            product_id,
            timestamp,
            price,
        });
        Ok(())
    }

    async fn last_price(&self, product_id: i64) -> Result<Option<PriceValue>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .history
            .get(&product_id)
            .and_then(|h| h.last())
            .map(|s| s.price.clone()))
    }

    async fn price_history(&self, product_id: i64) -> Result<Vec<PriceSnapshot>, StoreError> {
        let inner = self.inner.read().await;
        if !inner.products.contains_key(&product_id) {
            return Err(StoreError::UnknownProduct(product_id));
        }
        Ok(inner.history.get(&product_id).cloned().unwrap_or_default())
    }
}
