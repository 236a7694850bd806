//! Retry budget and jittered back-off for the fetcher.
//!
//! The delay between attempts is drawn uniformly from `[min_delay, max_delay]`
//! on every failure, so concurrent fetches do not retry in lock-step.

use std::time::Duration;

use pricebot_core::AppConfig;
use rand::Rng;

/// How a single `fetch` call spends its attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Proxy-backed attempts before the single direct fallback.
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Connect + read timeout applied to every individual attempt.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            min_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(15),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_retries: config.max_retries.max(1),
            min_delay: Duration::from_millis(config.retry_delay_min_ms),
            max_delay: Duration::from_millis(config.retry_delay_max_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// A policy with no waiting between attempts. Handy for tests and
    /// interactive one-off checks.
    #[must_use]
    pub fn without_delay(max_retries: u32, request_timeout: Duration) -> Self {
        Self {
            max_retries,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            request_timeout,
        }
    }

    /// Random delay in `[min_delay, max_delay]`; an inverted range collapses to `min_delay`.
    #[must_use]
    pub fn backoff_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let min_ms = duration_ms(self.min_delay);
        let max_ms = duration_ms(self.max_delay);
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// Worst-case wall time of one fetch: every proxy attempt plus the direct
    /// fallback times out, with the longest back-off after each failure.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        (self.request_timeout + self.max_delay).saturating_mul(attempts)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
