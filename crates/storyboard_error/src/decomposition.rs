//! Story decomposition errors.

/// Ways a text backend response can fail to yield a usable scene list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DecompositionErrorKind {
    /// The response parsed but held the wrong number of scenes
    #[display("Expected exactly {} scenes, backend returned {}", expected, found)]
    SceneCount {
        /// Required scene count
        expected: usize,
        /// Scenes actually parsed
        found: usize,
    },
    /// The response could not be parsed into scene records
    #[display("Malformed scene response: {}", _0)]
    Malformed(String),
    /// The backend returned no text at all
    #[display("Backend returned an empty response")]
    EmptyResponse,
}

/// Decomposition error carrying the raw backend response for diagnostics.
///
/// # Examples
///
/// ```
/// use storyboard_error::{DecompositionError, DecompositionErrorKind};
///
/// let err = DecompositionError::new(
///     DecompositionErrorKind::SceneCount { expected: 10, found: 9 },
///     "[...]",
/// );
/// assert_eq!(err.raw_response, "[...]");
/// assert!(format!("{}", err).contains("returned 9"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Decomposition Error: {} at line {} in {}", kind, line, file)]
pub struct DecompositionError {
    /// The specific error condition
    pub kind: DecompositionErrorKind,
    /// Unmodified backend response text
    pub raw_response: String,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl DecompositionError {
    /// Create a new DecompositionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DecompositionErrorKind, raw_response: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            raw_response: raw_response.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
