//! The caller-submitted story.

use serde::{Deserialize, Serialize};
use storyboard_error::ValidationError;

/// Raw narrative text accepted into a run.
///
/// The text is immutable once constructed; only non-blank text is accepted.
///
/// # Examples
///
/// ```
/// use storyboard_core::StoryInput;
///
/// let story = StoryInput::new("A fox and a crow meet in a forest.").unwrap();
/// assert_eq!(story.char_count(), 34);
/// assert!(StoryInput::new("  \n ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", text)]
pub struct StoryInput {
    text: String,
}

impl StoryInput {
    /// Accept story text, rejecting empty or whitespace-only input.
    #[track_caller]
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::new("story text must not be empty"));
        }
        Ok(Self { text })
    }

    /// The story text exactly as submitted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}
