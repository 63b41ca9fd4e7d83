//! Gallery lookup and download errors.

/// Specific error conditions for gallery operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GalleryErrorKind {
    /// No run with this id has been recorded
    #[display("Run not found: {}", _0)]
    RunNotFound(String),
    /// The run exists but has no scene at this index
    #[display("Run {} has no scene at index {}", run_id, index)]
    SceneNotFound {
        /// Run identifier
        run_id: String,
        /// Requested scene index
        index: usize,
    },
    /// The run is still rendering and cannot be modified
    #[display("Run {} is still in progress", _0)]
    RunInProgress(String),
    /// The scene has no image to encode
    #[display("Scene {} has no image", _0)]
    NoImage(usize),
    /// A download string could not be decoded
    #[display("Failed to decode download payload: {}", _0)]
    Decode(String),
}

/// Gallery error with location tracking.
///
/// # Examples
///
/// ```
/// use storyboard_error::{GalleryError, GalleryErrorKind};
///
/// let err = GalleryError::new(GalleryErrorKind::NoImage(4));
/// assert!(format!("{}", err).contains("Scene 4"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gallery Error: {} at line {} in {}", kind, line, file)]
pub struct GalleryError {
    /// The specific error condition
    pub kind: GalleryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GalleryError {
    /// Create a new GalleryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GalleryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
