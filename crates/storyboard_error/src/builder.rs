//! Errors raised while assembling backend requests.

/// Which backend request failed to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BuilderErrorKind {
    /// Text request sent for scene decomposition
    #[display("decomposition request")]
    Decomposition,

    /// Image request sent for one scene
    #[display("image request")]
    Image,
}

/// A backend request could not be built from the current settings.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} incomplete ({}) at line {} in {}", kind, detail, line, file)]
pub struct BuilderError {
    kind: BuilderErrorKind,
    detail: String,
    line: u32,
    file: &'static str,
}

impl BuilderError {
    /// Record a failed request assembly at the caller's location.
    #[track_caller]
    pub fn new(kind: BuilderErrorKind, detail: impl std::fmt::Display) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            detail: detail.to_string(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Which request failed.
    pub fn kind(&self) -> BuilderErrorKind {
        self.kind
    }

    /// Builder message, usually the missing field.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
