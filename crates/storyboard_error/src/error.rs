//! Top-level error wrapper types.

use crate::{
    BackendError, BackendErrorKind, BuilderError, ConfigError, DecompositionError, GalleryError,
    StorageError, ValidationError,
};

/// Every error condition a Storyboard operation can report.
///
/// # Examples
///
/// ```
/// use storyboard_error::{StoryboardError, ValidationError};
///
/// let err: StoryboardError = ValidationError::new("empty story").into();
/// assert!(format!("{}", err).contains("Validation Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryboardErrorKind {
    /// Bad caller input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Text backend output could not be turned into ten scenes
    #[from(DecompositionError)]
    Decomposition(DecompositionError),
    /// Text or image backend failure
    #[from(BackendError)]
    Backend(BackendError),
    /// Gallery lookup or download failure
    #[from(GalleryError)]
    Gallery(GalleryError),
    /// Export to disk failed
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
}

/// Storyboard error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyboard Error: {}", _0)]
pub struct StoryboardError(Box<StoryboardErrorKind>);

impl StoryboardError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryboardErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryboardErrorKind {
        &self.0
    }

    /// Backend failure kind, if this error came from a backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_error::{BackendError, BackendErrorKind, StoryboardError};
    ///
    /// let err: StoryboardError =
    ///     BackendError::new(BackendErrorKind::QuotaExceeded("credits".into())).into();
    /// assert!(matches!(err.backend_kind(), Some(BackendErrorKind::QuotaExceeded(_))));
    /// ```
    pub fn backend_kind(&self) -> Option<&BackendErrorKind> {
        match self.kind() {
            StoryboardErrorKind::Backend(e) => Some(&e.kind),
            _ => None,
        }
    }
}

impl StoryboardError {
    /// Message for end users, without the source location.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_error::{StoryboardError, ValidationError};
    ///
    /// let err: StoryboardError = ValidationError::new("story text is empty").into();
    /// assert_eq!(err.user_message(), "story text is empty");
    /// ```
    pub fn user_message(&self) -> String {
        match self.kind() {
            StoryboardErrorKind::Validation(e) => e.message.clone(),
            StoryboardErrorKind::Decomposition(e) => e.kind.to_string(),
            StoryboardErrorKind::Backend(e) => e.kind.to_string(),
            StoryboardErrorKind::Gallery(e) => e.kind.to_string(),
            StoryboardErrorKind::Storage(e) => e.kind.to_string(),
            StoryboardErrorKind::Config(e) => e.message.clone(),
            StoryboardErrorKind::Builder(e) => format!("{} incomplete: {}", e.kind(), e.detail()),
        }
    }
}

impl<T> From<T> for StoryboardError
where
    T: Into<StoryboardErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyboard operations.
pub type StoryboardResult<T> = std::result::Result<T, StoryboardError>;

impl crate::RetryableError for StoryboardError {
    fn is_retryable(&self) -> bool {
        self.backend_kind().is_some_and(|kind| kind.is_retryable())
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self.backend_kind() {
            Some(kind) => kind.retry_strategy_params(),
            None => (2000, 0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuilderErrorKind, DecompositionErrorKind, StorageErrorKind};

    #[test]
    fn user_message_omits_source_location() {
        let errors: Vec<StoryboardError> = vec![
            ValidationError::new("story is too long").into(),
            DecompositionError::new(DecompositionErrorKind::EmptyResponse, "").into(),
            BackendError::new(BackendErrorKind::Unavailable("overloaded".into())).into(),
            StorageError::new(StorageErrorKind::FileWrite("scene_01.png".into())).into(),
            ConfigError::new("bad width").into(),
            BuilderError::new(BuilderErrorKind::Image, "`prompt` must be initialized").into(),
        ];

        for err in errors {
            let message = err.user_message();
            assert!(!message.contains("at line"), "{}", message);
            assert!(!message.contains(".rs"), "{}", message);
            assert!(err.to_string().contains("at line"));
        }
    }

    #[test]
    fn user_message_keeps_inner_text() {
        let err: StoryboardError = ValidationError::new("story is too long").into();
        assert_eq!(err.user_message(), "story is too long");

        let err: StoryboardError =
            BuilderError::new(BuilderErrorKind::Decomposition, "missing messages").into();
        assert_eq!(err.user_message(), "decomposition request incomplete: missing messages");
    }
}
