//! Product-page retrieval through rotating proxies with a direct fallback.

mod transport;

use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use pricebot_core::{ProxyDescriptor, RawPage};
use reqwest::Client;

use crate::error::{Exhaustion, ScraperError, TransportError};
use crate::proxy_pool::ProxyPool;
use crate::retry::RetryPolicy;
use crate::user_agent::UserAgentRotator;

/// Anything that can turn a URL into raw markup.
///
/// [`RetryingFetcher`] is the production implementation; tests substitute
/// canned pages.
pub trait PageSource: Send + Sync {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<RawPage, ScraperError>> + Send;
}

/// One HTTP attempt within a fetch. `proxy == None` is the direct fallback.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    pub proxy: Option<ProxyDescriptor>,
    pub user_agent: String,
    pub attempt_number: u32,
}

/// Fetches product pages, rotating proxy and user agent on every attempt.
///
/// Stateless apart from the shared [`ProxyPool`] cursor: any number of
/// fetches may run concurrently, each with its own working set and budget.
///
/// Per call:
/// 1. Up to `max_retries` attempts, each through the next proxy of a private
///    working set. A proxy that fails is dropped from that working set.
/// 2. If the working set empties while budget remains, the call fails with
///    [`Exhaustion::ProxiesExhausted`].
/// 3. If the whole budget is spent, one direct attempt is made; if it fails
///    the call fails with [`Exhaustion::DirectFailed`].
///
/// A jittered back-off from the [`RetryPolicy`] separates consecutive attempts.
/// An empty pool skips straight to the single direct attempt.
pub struct RetryingFetcher {
    pool: ProxyPool,
    user_agents: UserAgentRotator,
    policy: RetryPolicy,
    proxied: HashMap<ProxyDescriptor, Client>,
    direct: Client,
}

impl RetryingFetcher {
    /// Builds one HTTP client per configured proxy plus the direct client.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] with [`TransportError::InvalidProxy`]
    /// if a proxy address cannot be turned into a client, or
    /// [`TransportError::Http`] if the direct client cannot be built.
    pub fn new(
        pool: ProxyPool,
        user_agents: UserAgentRotator,
        policy: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let proxied = pool
            .proxies()
            .iter()
            .map(|descriptor| {
                transport::proxied_client(descriptor, policy.request_timeout)
                    .map(|client| (descriptor.clone(), client))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        let direct = transport::direct_client(policy.request_timeout)?;

        Ok(Self {
            pool,
            user_agents,
            policy,
            proxied,
            direct,
        })
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Retrieves `url`, returning the body of the first 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::FetchExhausted`] carrying the last transport
    /// error once the policy above gives up.
    pub async fn fetch(&self, url: &str) -> Result<RawPage, ScraperError> {
        if self.pool.is_empty() {
            tracing::debug!(url, "no proxies configured; fetching directly");
            return self.fetch_direct(url, 1).await;
        }

        let max_retries = self.policy.max_retries;
        let mut working = self.pool.working_set();

        for attempt_number in 1..=max_retries {
            let Some(proxy) = working.next() else {
                // Unreachable in practice: emptiness is checked after each failure.
                break;
            };

            let attempt = FetchAttempt {
                proxy: Some(proxy.clone()),
                user_agent: self.user_agents.pick().to_owned(),
                attempt_number,
            };

            match self.attempt(url, &attempt).await {
                Ok(html) => return Ok(page(url, html)),
                Err(err) => {
                    tracing::warn!(
                        url,
                        attempt = attempt_number,
                        max_retries,
                        proxy = %proxy,
                        proxy_failure = err.is_proxy_failure(),
                        error = %err,
                        "proxied attempt failed"
                    );
                    working.remove(&proxy);

                    if working.is_empty() && attempt_number < max_retries {
                        tracing::error!(url, attempts = attempt_number, "every proxy failed for this fetch");
                        return Err(ScraperError::FetchExhausted {
                            url: url.to_owned(),
                            attempts: attempt_number,
                            reason: Exhaustion::ProxiesExhausted,
                            last_error: Box::new(err),
                        });
                    }

                    self.back_off(url).await;
                }
            }
        }

        tracing::info!(url, max_retries, "proxy budget spent; trying direct connection");
        self.fetch_direct(url, max_retries.saturating_add(1)).await
    }

    async fn fetch_direct(&self, url: &str, attempt_number: u32) -> Result<RawPage, ScraperError> {
        let attempt = FetchAttempt {
            proxy: None,
            user_agent: self.user_agents.pick().to_owned(),
            attempt_number,
        };

        match self.attempt(url, &attempt).await {
            Ok(html) => Ok(page(url, html)),
            Err(err) => {
                tracing::error!(url, attempts = attempt_number, error = %err, "direct attempt failed");
                Err(ScraperError::FetchExhausted {
                    url: url.to_owned(),
                    attempts: attempt_number,
                    reason: Exhaustion::DirectFailed,
                    last_error: Box::new(err),
                })
            }
        }
    }

    /// Issues one GET and returns the body on 2xx.
    async fn attempt(&self, url: &str, attempt: &FetchAttempt) -> Result<String, TransportError> {
        // Every pool member got a client in `new`, so the lookup cannot miss.
        let client = match &attempt.proxy {
            Some(proxy) => self.proxied.get(proxy).unwrap_or(&self.direct),
            None => &self.direct,
        };

        let route = attempt
            .proxy
            .as_ref()
            .map_or_else(|| "direct".to_owned(), ToString::to_string);
        tracing::info!(
            url,
            attempt = attempt.attempt_number,
            proxy = %route,
            "requesting product page"
        );

        let response = client
            .get(url)
            .header(reqwest::header::USER_AGENT, &attempt.user_agent)
            .send()
            .await
            .map_err(|e| TransportError::from_send(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let html = response.text().await.map_err(|source| {
            if source.is_timeout() {
                TransportError::Timeout {
                    url: url.to_owned(),
                    source,
                }
            } else {
                TransportError::Body {
                    url: url.to_owned(),
                    source,
                }
            }
        })?;

        tracing::info!(url, attempt = attempt.attempt_number, bytes = html.len(), "page retrieved");
        Ok(html)
    }

    async fn back_off(&self, url: &str) {
        let delay = self.policy.backoff_delay();
        if delay.is_zero() {
            return;
        }
        tracing::info!(url, ?delay, "backing off before next attempt");
        tokio::time::sleep(delay).await;
    }
}

impl PageSource for RetryingFetcher {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<RawPage, ScraperError>> + Send {
        self.fetch(url)
    }
}

fn page(url: &str, html: String) -> RawPage {
    RawPage {
        url: url.to_owned(),
        html,
        fetched_at: Utc::now(),
    }
}
