//! Batch price check across every tracked product.

use futures::stream::{self, StreamExt};
use pricebot_core::{
    detect_price_change, escape_markdown_v2, format_price_change, Extracted, Notifier, PriceCheck,
    PriceStore, TrackedProduct,
};
use pricebot_scraper::{PageSource, ProductTracker};

/// What happened to one product during a pass.
#[derive(Debug)]
pub(crate) enum ProductOutcome {
    FirstObservation,
    Unchanged,
    Changed { notified: bool },
    Degraded,
    Failed(anyhow::Error),
}

/// Per-pass counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollTotals {
    pub checked: usize,
    pub first_seen: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub notified: usize,
    pub degraded: usize,
    pub failed: usize,
}

impl PollTotals {
    fn add(&mut self, outcome: &ProductOutcome) {
        self.checked += 1;
        match outcome {
            ProductOutcome::FirstObservation => self.first_seen += 1,
            ProductOutcome::Unchanged => self.unchanged += 1,
            ProductOutcome::Changed { notified } => {
                self.changed += 1;
                if *notified {
                    self.notified += 1;
                }
            }
            ProductOutcome::Degraded => self.degraded += 1,
            ProductOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Checks every tracked product with at most `concurrency_limit` lookups in
/// flight. One product's failure never stops the others.
///
/// # Errors
///
/// Returns an error if the tracked-product list cannot be read, or if every
/// product in a non-empty batch failed.
pub(crate) async fn check_all<S, P, N>(
    tracker: &ProductTracker<S>,
    store: &P,
    notifier: &N,
    concurrency_limit: usize,
) -> anyhow::Result<PollTotals>
where
    S: PageSource,
    P: PriceStore,
    N: Notifier,
{
    let products = store.tracked_products().await?;
    let product_count = products.len();
    tracing::info!(products = product_count, concurrency_limit, "price check pass starting");

    let results: Vec<(&TrackedProduct, ProductOutcome)> = stream::iter(&products)
        .map(|product| async move {
            (product, check_one(tracker, store, notifier, product).await)
        })
        .buffer_unordered(concurrency_limit.max(1))
        .collect()
        .await;

    let mut totals = PollTotals::default();
    for (product, outcome) in &results {
        if let ProductOutcome::Failed(e) = outcome {
            tracing::warn!(
                product_id = product.product_id,
                url = %product.url,
                error = %e,
                "price check failed; skipping"
            );
        }
        totals.add(outcome);
    }

    if totals.failed > 0 {
        tracing::warn!(
            failed = totals.failed,
            total = product_count,
            "some products failed during the pass"
        );
    }
    if product_count > 0 && totals.failed == product_count {
        anyhow::bail!("all {product_count} products failed the price check");
    }

    tracing::info!(
        checked = totals.checked,
        changed = totals.changed,
        unchanged = totals.unchanged,
        degraded = totals.degraded,
        failed = totals.failed,
        "price check pass finished"
    );
    Ok(totals)
}

async fn check_one<S, P, N>(
    tracker: &ProductTracker<S>,
    store: &P,
    notifier: &N,
    product: &TrackedProduct,
) -> ProductOutcome
where
    S: PageSource,
    P: PriceStore,
    N: Notifier,
{
    let info = match tracker.product_info(&product.url).await {
        Ok(info) => info,
        Err(e) => return ProductOutcome::Failed(e.into()),
    };
    let last = match store.last_price(product.product_id).await {
        Ok(last) => last,
        Err(e) => return ProductOutcome::Failed(e.into()),
    };

    let check = detect_price_change(last.as_ref(), &info);
    if let PriceCheck::FirstObservation(current) | PriceCheck::Changed { current, .. } = &check {
        if let Err(e) = store
            .record_price_change(product.product_id, current.clone())
            .await
        {
            return ProductOutcome::Failed(e.into());
        }
    }

    match check {
        PriceCheck::FirstObservation(_) => ProductOutcome::FirstObservation,
        PriceCheck::Unchanged => ProductOutcome::Unchanged,
        PriceCheck::Degraded => {
            tracing::info!(product_id = product.product_id, "no price on page; retry next pass");
            ProductOutcome::Degraded
        }
        PriceCheck::Changed { previous, current } => {
            let name = match &info.name {
                Extracted::Found(name) => name.as_str(),
                Extracted::Unavailable => product.name.as_str(),
            };
            let message = escape_markdown_v2(&format_price_change(name, &previous, &current));
            let notified = match notifier.notify(product.owner_id, &message).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, "price change recorded but notification failed");
                    false
                }
            };
            tracing::info!(
                product_id = product.product_id,
                previous = %previous,
                current = %current,
                "price changed"
            );
            ProductOutcome::Changed { notified }
        }
    }
}
