//! Generative backend errors and retry classification.

/// Failure conditions reported by a text or image generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum BackendErrorKind {
    /// Backend unreachable, connection reset, or server-side outage
    #[display("Backend unavailable: {}", _0)]
    Unavailable(String),
    /// Backend call exceeded its deadline
    #[display("Backend call timed out after {:?}", _0)]
    Timeout(std::time::Duration),
    /// Backend refused the content under its safety policy
    #[display("Content rejected by backend: {}", _0)]
    ContentRejected(String),
    /// Rate limit or credit exhaustion
    #[display("Backend quota exceeded: {}", _0)]
    QuotaExceeded(String),
    /// Permanent HTTP failure that is neither quota nor content policy
    #[display("Backend rejected request with HTTP {}: {}", status, message)]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or SDK message
        message: String,
    },
    /// Backend answered but the payload could not be interpreted
    #[display("Invalid backend response: {}", _0)]
    InvalidResponse(String),
    /// Credential not supplied to the client
    #[display("Missing credentials: {} not set", _0)]
    MissingCredentials(String),
}

impl BackendErrorKind {
    /// Classify an HTTP status code returned by a provider.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_error::BackendErrorKind;
    ///
    /// assert!(matches!(
    ///     BackendErrorKind::from_status(429, "slow down"),
    ///     BackendErrorKind::QuotaExceeded(_)
    /// ));
    /// assert!(matches!(
    ///     BackendErrorKind::from_status(503, "loading"),
    ///     BackendErrorKind::Unavailable(_)
    /// ));
    /// ```
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            402 | 429 => BackendErrorKind::QuotaExceeded(message),
            451 => BackendErrorKind::ContentRejected(message),
            408 | 500..=599 => BackendErrorKind::Unavailable(format!("HTTP {status}: {message}")),
            _ => BackendErrorKind::Rejected { status, message },
        }
    }

    /// Check if this error type should be retried by the transport layer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendErrorKind::Unavailable(_) | BackendErrorKind::Timeout(_)
        )
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            BackendErrorKind::Unavailable(_) => (2000, 3, 30),
            BackendErrorKind::Timeout(_) => (1000, 2, 10),
            _ => (2000, 0, 0),
        }
    }
}

/// Backend error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{BackendError, BackendErrorKind};
///
/// let err = BackendError::new(BackendErrorKind::ContentRejected("unsafe".to_string()));
/// assert!(format!("{}", err).contains("rejected"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backend Error: {} at line {} in {}", kind, line, file)]
pub struct BackendError {
    /// The kind of error that occurred
    pub kind: BackendErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl BackendError {
    /// Create a new BackendError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BackendErrorKind {
        &self.kind
    }
}

/// Trait for errors that support retry logic.
///
/// # Examples
///
/// ```
/// use storyboard_error::{BackendError, BackendErrorKind, RetryableError};
///
/// let err = BackendError::new(BackendErrorKind::Unavailable("reset".to_string()));
/// assert!(err.is_retryable());
///
/// let err = BackendError::new(BackendErrorKind::QuotaExceeded("credits".to_string()));
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 3, 30)
    }
}

impl RetryableError for BackendError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
