use std::io::Read;
use std::path::Path;
use storyboard_core::StoryInput;
use storyboard_error::{StorageError, StorageErrorKind, StoryboardResult};

/// Read a story from a file, or from `reader` when the path is `-`.
///
/// # Errors
///
/// Returns a storage error if the source cannot be read and a validation
/// error if it holds only whitespace.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// let story = storyboard::read_story(Path::new("-"), "A fox meets a crow.".as_bytes()).unwrap();
/// assert_eq!(story.text(), "A fox meets a crow.");
/// ```
pub fn read_story(path: &Path, mut reader: impl Read) -> StoryboardResult<StoryInput> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("stdin: {}", e)))
        })?;
        text
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?
    };

    tracing::debug!(source = %path.display(), chars = text.chars().count(), "Read story");
    Ok(StoryInput::new(text)?)
}
