//! Unattended polling of tracked products.
//!
//! The store is seeded from the tracked-products file on start-up, then every
//! pass checks each product, records new prices and notifies owners of
//! changes. Failed products are logged and retried on the next pass.

mod runner;

use std::time::Duration;

use anyhow::Context;
use pricebot_core::{
    AppConfig, InMemoryPriceStore, Notifier, NotifyError, PriceStore, StoreError, TrackedEntry,
};
use pricebot_scraper::ProductTracker;

pub(crate) use runner::{check_all, PollTotals};

/// Writes notifications to the log instead of a chat transport.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, owner_id: i64, message: &str) -> Result<(), NotifyError> {
        tracing::info!(owner_id, message, "price change notification");
        Ok(())
    }
}

/// Adds every entry to `store` under its canonical URL.
///
/// Invalid URLs and duplicates are skipped with a warning. Returns how many
/// products were added.
///
/// # Errors
///
/// Returns an error only if the store backend itself fails.
pub(crate) async fn seed_store<P: PriceStore>(
    store: &P,
    entries: &[TrackedEntry],
) -> anyhow::Result<usize> {
    let mut added = 0;
    for entry in entries {
        let url = match pricebot_scraper::url::normalize(&entry.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(owner_id = entry.owner_id, error = %e, "skipping tracked product");
                continue;
            }
        };
        let name = entry.name.as_deref().unwrap_or(url.as_str());

        match store.add_product(entry.owner_id, &url, name, None).await {
            Ok(_) => added += 1,
            Err(StoreError::AlreadyTracked { owner_id, url }) => {
                tracing::warn!(owner_id, url = %url, "duplicate tracked product; skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(added)
}

/// Runs price-check passes until interrupted, or once with `once`.
///
/// # Errors
///
/// Returns an error if configuration files cannot be loaded, or, with
/// `once`, if the single pass fails as a whole.
pub(crate) async fn run_poll(config: &AppConfig, once: bool, interval_secs: u64) -> anyhow::Result<()> {
    let tracked = pricebot_core::load_tracked(&config.tracked_path)
        .with_context(|| format!("loading {}", config.tracked_path.display()))?;
    let store = InMemoryPriceStore::new();
    let added = seed_store(&store, &tracked.products).await?;
    tracing::info!(products = added, "tracked products loaded");

    let proxies = crate::check::load_proxy_list(config)?;
    let tracker = ProductTracker::from_config(config, proxies)?;
    let notifier = LogNotifier;

    if once {
        let totals = check_all(&tracker, &store, &notifier, config.concurrency_limit).await?;
        print_totals(&totals);
        return Ok(());
    }

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match check_all(&tracker, &store, &notifier, config.concurrency_limit).await {
                    Ok(totals) => print_totals(&totals),
                    Err(e) => tracing::error!(error = %e, "price check pass failed"),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("interrupted; stopping poll loop");
                return Ok(());
            }
        }
    }
}

fn print_totals(totals: &PollTotals) {
    println!(
        "checked={} first_seen={} unchanged={} changed={} notified={} degraded={} failed={}",
        totals.checked,
        totals.first_seen,
        totals.unchanged,
        totals.changed,
        totals.notified,
        totals.degraded,
        totals.failed
    );
}

#[cfg(test)]
#[path = "poll_test.rs"]
mod tests;
