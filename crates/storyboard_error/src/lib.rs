//! Error types for the Storyboard library.
//!
//! This crate provides the foundation error types used throughout the Storyboard workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use storyboard_error::{StoryboardResult, ValidationError};
//!
//! fn accept(story: &str) -> StoryboardResult<&str> {
//!     if story.trim().is_empty() {
//!         Err(ValidationError::new("story text is empty"))?
//!     }
//!     Ok(story)
//! }
//!
//! assert!(accept("   ").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod builder;
mod config;
mod decomposition;
mod error;
mod gallery;
mod storage;
mod validation;

pub use backend::{BackendError, BackendErrorKind, RetryableError};
pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use decomposition::{DecompositionError, DecompositionErrorKind};
pub use error::{StoryboardError, StoryboardErrorKind, StoryboardResult};
pub use gallery::{GalleryError, GalleryErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::ValidationError;
