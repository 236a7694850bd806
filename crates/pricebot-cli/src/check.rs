//! One-off product lookups: `check` and `validate`.

use std::time::Duration;

use anyhow::Context;
use pricebot_core::{AppConfig, ProxyDescriptor, ValidationMode};
use pricebot_scraper::{ProductTracker, UrlValidator, UserAgentRotator};

/// Loads the configured proxy list. A missing file means direct-only mode.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is invalid.
pub(crate) fn load_proxy_list(config: &AppConfig) -> anyhow::Result<Vec<ProxyDescriptor>> {
    if !config.proxies_path.exists() {
        tracing::warn!(
            path = %config.proxies_path.display(),
            "proxy file not found; fetching directly"
        );
        return Ok(Vec::new());
    }
    let file = pricebot_core::load_proxies(&config.proxies_path)
        .with_context(|| format!("loading {}", config.proxies_path.display()))?;
    tracing::info!(count = file.proxies.len(), "proxies loaded");
    Ok(file.proxies)
}

/// Fetches `url` once and prints what was extracted.
///
/// `deadline_secs` bounds the whole lookup, retries and back-off included.
///
/// # Errors
///
/// Returns an error if the URL is invalid, every fetch route fails or the
/// deadline passes first.
pub(crate) async fn run_check(
    config: &AppConfig,
    url: &str,
    deadline_secs: Option<u64>,
) -> anyhow::Result<()> {
    let proxies = load_proxy_list(config)?;
    let tracker = ProductTracker::from_config(config, proxies)?;

    let lookup = tracker.product_info(url);
    let result = match deadline_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), lookup)
            .await
            .map_err(|_| anyhow::anyhow!("no answer for {url} within {secs}s"))?,
        None => lookup.await,
    };

    match result {
        Ok(info) => {
            println!("Producto: {}", info.name);
            println!("Precio: {}", info.price);
            if info.is_degraded() {
                tracing::warn!(url, "some fields could not be read; try again later");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}

/// Prints the canonical form of `url`, optionally confirming it is reachable.
///
/// # Errors
///
/// Returns an error if the URL is rejected or the reachability check fails.
pub(crate) async fn run_validate(config: &AppConfig, url: &str, network: bool) -> anyhow::Result<()> {
    let validator = if network || matches!(config.validation_mode, ValidationMode::Network) {
        let user_agents = UserAgentRotator::new(config.user_agents.clone());
        UrlValidator::network(
            Duration::from_secs(config.request_timeout_secs),
            user_agents.pick(),
        )?
    } else {
        UrlValidator::syntactic()
    };

    match validator.check(url).await {
        Ok(canonical) => {
            println!("{canonical}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Err(e.into())
        }
    }
}
