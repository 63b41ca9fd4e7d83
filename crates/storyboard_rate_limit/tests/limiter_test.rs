//! Tests for rate limiting and transport retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storyboard_error::{BackendError, BackendErrorKind, StoryboardError};
use storyboard_rate_limit::{RateLimiter, RetryConfig, TierConfig};

fn tier(max_concurrent: Option<u32>) -> TierConfig {
    TierConfig {
        name: "Test".to_string(),
        rpm: None,
        rpd: None,
        max_concurrent,
        models: HashMap::new(),
    }
}

fn fast_retry(max_retries: usize) -> RetryConfig {
    RetryConfig::default()
        .with_max_retries(max_retries)
        .with_initial_backoff_ms(1)
}

#[tokio::test]
async fn test_concurrency_limit() {
    let limiter = RateLimiter::new(tier(Some(2)));

    let first = limiter.try_acquire();
    let second = limiter.try_acquire();
    let third = limiter.try_acquire();

    assert!(first.is_some());
    assert!(second.is_some());
    assert!(third.is_none());

    drop(first);
    assert!(limiter.try_acquire().is_some());
}

#[tokio::test]
async fn test_rpm_limit_blocks_try_acquire() {
    let mut config = tier(None);
    config.rpm = Some(1);
    let limiter = RateLimiter::new(config);

    assert!(limiter.try_acquire().is_some());
    assert!(limiter.try_acquire().is_none());
}

#[tokio::test]
async fn test_retries_transient_errors() {
    let limiter = RateLimiter::new_with_retry(tier(Some(1)), fast_retry(3));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<&str, StoryboardError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(BackendError::new(BackendErrorKind::Unavailable("reset".into())).into())
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_quota_errors_are_not_retried() {
    let limiter = RateLimiter::new_with_retry(tier(Some(1)), fast_retry(3));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), StoryboardError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(BackendError::new(BackendErrorKind::QuotaExceeded("429".into())).into())
            }
        })
        .await;

    let err = result.unwrap_err();
    assert!(matches!(
        err.backend_kind(),
        Some(BackendErrorKind::QuotaExceeded(_))
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_disabled() {
    let limiter = RateLimiter::new_with_retry(tier(Some(1)), RetryConfig::disabled());
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), StoryboardError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(BackendError::new(BackendErrorKind::Timeout(Duration::from_secs(5))).into())
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let limiter = RateLimiter::new_with_retry(tier(Some(1)), fast_retry(2));
    let attempts = Arc::new(AtomicUsize::new(0));

    let result: Result<(), StoryboardError> = limiter
        .execute(|| {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(BackendError::new(BackendErrorKind::Unavailable("down".into())).into())
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(limiter.available_permits(), 1);
}
