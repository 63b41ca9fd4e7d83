//! Core data types for the Storyboard story illustration pipeline.
//!
//! This crate holds the data model shared by every other crate: the story a
//! caller submits, the ten scene prompts derived from it, the per-scene
//! outcomes, and the run aggregate that ties them together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod request;
mod result;
mod run;
mod scene;
mod settings;
mod story;

pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateResponse, ImageRequest, ImageRequestBuilder,
    Message, Output, RenderedImage, Role,
};
pub use result::{SceneOutcome, SceneResult, SceneStatus};
pub use run::{ProgressUpdate, Run, RunId, RunStatus};
pub use scene::{SCENE_COUNT, ScenePrompt, compose_raw_prompt};
pub use settings::{ImageSettings, PipelineConfig};
pub use story::StoryInput;
