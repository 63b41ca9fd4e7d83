//! Test utilities for pipeline tests.
//!
//! Scripted mock backends plus builders for canned scene responses.

#![allow(dead_code)]

pub mod mock_backends;

#[allow(unused_imports)]
pub use mock_backends::{MockImageBackend, MockReply, MockTextBackend, scene_marker};

use storyboard_core::{ImageSettings, PipelineConfig, StoryInput};
use storyboard_gallery::GalleryStore;
use storyboard_pipeline::{ImageSynthesizer, PipelineOrchestrator, SceneDecomposer};

/// The fox and crow story used across scenario tests.
pub const FOX_AND_CROW: &str = "A fox and a crow meet in a forest.";

/// Build a story input, panicking on blank text.
pub fn story(text: &str) -> StoryInput {
    StoryInput::new(text).expect("test story is not blank")
}

/// A `{"scenes": [...]}` response with `count` well-formed scenes.
///
/// Each description starts with [`scene_marker`] so the image mock can tell
/// scenes apart.
pub fn scenes_json(count: usize) -> String {
    let scenes: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"description": "{} The fox looks up at the crow, moment {}", "visual_elements": ["red fox", "black crow", "oak tree"], "style": "Disney-style cartoon", "mood": "curious"}}"#,
                scene_marker(i),
                i + 1
            )
        })
        .collect();
    format!("{{\"scenes\": [{}]}}", scenes.join(", "))
}

/// Legacy `list = [[...], ...]` response with `count` rows.
pub fn legacy_rows(count: usize) -> String {
    let rows: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"    ["{} The crow sings from the branch", "storybook watercolor", "crow, cheese, branch", "playful"]"#,
                scene_marker(i)
            )
        })
        .collect();
    format!("list = [\n{}\n]", rows.join(",\n"))
}

/// Pipeline settings with caching off and a short backend timeout.
pub fn test_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_cache_decompositions(false)
        .with_backend_timeout_secs(5)
}

/// An orchestrator over the given mocks with a fresh gallery.
pub fn orchestrator(
    text: MockTextBackend,
    image: MockImageBackend,
) -> PipelineOrchestrator<MockTextBackend, MockImageBackend> {
    orchestrator_with_gallery(text, image, GalleryStore::new())
}

/// An orchestrator over the given mocks writing into `gallery`.
pub fn orchestrator_with_gallery(
    text: MockTextBackend,
    image: MockImageBackend,
    gallery: GalleryStore,
) -> PipelineOrchestrator<MockTextBackend, MockImageBackend> {
    PipelineOrchestrator::new(
        SceneDecomposer::new(text, test_config()),
        ImageSynthesizer::new(image, ImageSettings::default()),
        gallery,
    )
}
