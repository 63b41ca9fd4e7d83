use std::io::Write;
use std::path::Path;
use storyboard::{StoryboardErrorKind, read_story};

#[test]
fn test_read_story_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "Once upon a time, a fox met a crow.")?;

    let story = read_story(file.path(), std::io::empty())?;

    assert!(story.text().starts_with("Once upon a time"));
    Ok(())
}

#[test]
fn test_read_story_from_stdin_marker() -> anyhow::Result<()> {
    let story = read_story(Path::new("-"), "The crow sang.".as_bytes())?;
    assert_eq!(story.text(), "The crow sang.");
    Ok(())
}

#[test]
fn test_blank_story_is_validation_error() {
    let err = read_story(Path::new("-"), " \n\t ".as_bytes()).unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Validation(_)));
}

#[test]
fn test_missing_file_is_storage_error() {
    let err = read_story(Path::new("/definitely/not/here/story.txt"), std::io::empty()).unwrap_err();
    assert!(matches!(err.kind(), StoryboardErrorKind::Storage(_)));
}
