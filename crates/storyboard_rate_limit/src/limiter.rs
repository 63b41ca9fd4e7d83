//! Rate limiter built on governor and a Tokio semaphore.
//!
//! - RPM and RPD quotas use governor's GCRA limiters.
//! - Concurrent requests are capped with a semaphore.
//! - [`RateLimiter::execute`] adds exponential-backoff retry for transient
//!   failures via tokio-retry2.

use crate::{RetryConfig, Tier};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use storyboard_error::{BackendError, BackendErrorKind, RetryableError};
use tokio::sync::Semaphore;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter owning a tiered value (usually a backend client).
///
/// The inner value is reachable through [`RateLimiter::inner`]; calls that
/// should count against the quota go through [`RateLimiter::acquire`] or
/// [`RateLimiter::execute`].
///
/// # Example
///
/// ```
/// use storyboard_rate_limit::{RateLimiter, TierConfig};
/// use std::collections::HashMap;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tier = TierConfig {
///     name: "Test".to_string(),
///     rpm: Some(60),
///     rpd: None,
///     max_concurrent: Some(1),
///     models: HashMap::new(),
/// };
/// let limiter = RateLimiter::new(tier);
/// let guard = limiter.acquire().await.unwrap();
/// assert_eq!(limiter.available_permits(), 0);
/// drop(guard);
/// assert_eq!(limiter.available_permits(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiter<T: Tier> {
    inner: T,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    rpd_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
    retry: RetryConfig,
}

impl<T: Tier> RateLimiter<T> {
    /// Create a limiter enforcing every quota the tier declares, with default retry.
    pub fn new(tier: T) -> Self {
        Self::new_with_retry(tier, RetryConfig::default())
    }

    /// Create a limiter with explicit retry settings.
    pub fn new_with_retry(tier: T, retry: RetryConfig) -> Self {
        let rpm_limiter = tier.rpm().and_then(|rpm| {
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))))
        });

        // The daily quota is released as one burst, replenished over 24 hours.
        let rpd_limiter = tier.rpd().and_then(|rpd| {
            NonZeroU32::new(rpd).and_then(|n| {
                Quota::with_period(Duration::from_secs(86_400) / n.get())
                    .map(|quota| Arc::new(GovernorRateLimiter::direct(quota.allow_burst(n))))
            })
        });

        let max_concurrent = tier
            .max_concurrent()
            .map(|n| n.max(1) as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);
        let concurrent_semaphore = Arc::new(Semaphore::new(max_concurrent));

        debug!(
            tier = tier.name(),
            rpm = ?tier.rpm(),
            rpd = ?tier.rpd(),
            max_concurrent,
            "Created rate limiter"
        );

        Self {
            inner: tier,
            rpm_limiter,
            rpd_limiter,
            concurrent_semaphore,
            retry,
        }
    }

    /// The wrapped value.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Retry settings applied by [`RateLimiter::execute`].
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Free concurrent request slots.
    pub fn available_permits(&self) -> usize {
        self.concurrent_semaphore.available_permits()
    }

    /// Wait until every quota allows one request.
    ///
    /// The returned guard holds a concurrent slot until dropped.
    ///
    /// # Errors
    ///
    /// Fails only if the semaphore was closed.
    pub async fn acquire(&self) -> Result<RateLimiterGuard, BackendError> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.until_ready().await;
        }

        let permit = self
            .concurrent_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| {
                BackendError::new(BackendErrorKind::Unavailable(
                    "rate limiter closed".to_string(),
                ))
            })?;

        Ok(RateLimiterGuard { _permit: permit })
    }

    /// Acquire without waiting; `None` if any quota would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;

        Some(RateLimiterGuard { _permit: permit })
    }

    /// Run an operation under the quotas, retrying transient failures.
    ///
    /// Each attempt acquires its own permit. Errors whose
    /// [`RetryableError::is_retryable`] is false return immediately.
    pub async fn execute<F, Fut, R, E>(&self, operation: F) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display + From<BackendError>,
    {
        let retries = if *self.retry.enabled() {
            *self.retry.max_retries()
        } else {
            0
        };

        let retry_strategy = ExponentialBackoff::from_millis(*self.retry.initial_backoff_ms())
            .factor(2)
            .max_delay(Duration::from_secs(*self.retry.max_delay_secs()))
            .map(jitter)
            .take(retries);

        Retry::spawn(retry_strategy, || async {
            let _guard = self.acquire().await.map_err(|e| RetryError::Permanent(E::from(e)))?;

            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Transient backend error, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    debug!(error = %e, "Permanent backend error, not retrying");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

/// Holds one concurrent request slot until dropped.
pub struct RateLimiterGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
