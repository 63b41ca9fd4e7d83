use std::future::Future;
use std::time::Duration;
use storyboard_error::{BackendError, BackendErrorKind, StoryboardResult};

/// Await a backend call, failing with a timeout error once `limit` elapses.
pub(crate) async fn with_deadline<F, T>(limit: Duration, call: F) -> StoryboardResult<T>
where
    F: Future<Output = StoryboardResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Backend call timed out");
            Err(BackendError::new(BackendErrorKind::Timeout(limit)).into())
        }
    }
}
