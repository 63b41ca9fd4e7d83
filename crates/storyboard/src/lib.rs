//! Storyboard - story to illustrated scenes
//!
//! Storyboard takes a block of narrative text, asks a text model to split it
//! into exactly ten scenes, then renders each scene with an image model, one
//! scene at a time. Every run lands in an in-memory gallery that can be read
//! while rendering is still going, encoded for download, or exported to disk.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use storyboard::{
//!     GalleryStore, GeminiClient, HuggingFaceImageClient, ImageSynthesizer,
//!     PipelineOrchestrator, SceneDecomposer, StoryInput, StoryboardConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryboardConfig::load()?;
//!     let orchestrator = PipelineOrchestrator::new(
//!         SceneDecomposer::new(GeminiClient::from_config(&config)?, config.pipeline.clone()),
//!         ImageSynthesizer::new(HuggingFaceImageClient::from_config(&config)?, config.image.clone()),
//!         GalleryStore::new(),
//!     );
//!
//!     let run = orchestrator
//!         .run(StoryInput::new("A fox and a crow meet in a forest.")?)
//!         .await?;
//!     println!("{}", storyboard::RunSummary::from_run(&run));
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `gemini` - Google Gemini text backend
//! - `huggingface` - HuggingFace image inference backend
//! - `all-providers` - both backends (required by the `storyboard` binary)
//!
//! # Architecture
//!
//! - `storyboard_core` - Data model (StoryInput, ScenePrompt, SceneResult, Run)
//! - `storyboard_interface` - TextBackend and ImageBackend traits
//! - `storyboard_error` - Error types
//! - `storyboard_rate_limit` - Configuration, rate limiting and retry
//! - `storyboard_models` - Backend clients
//! - `storyboard_pipeline` - Decomposer, synthesizer and orchestrator
//! - `storyboard_gallery` - Gallery store, download encoding and export
//!
//! This crate re-exports everything for convenience.

pub use storyboard_core::*;
pub use storyboard_error::*;
pub use storyboard_gallery::*;
pub use storyboard_interface::*;
pub use storyboard_pipeline::*;
pub use storyboard_rate_limit::*;

#[cfg(any(feature = "gemini", feature = "huggingface"))]
pub use storyboard_models::*;

mod story_source;
mod summary;
pub mod telemetry;

pub use story_source::read_story;
pub use summary::{RunSummary, SceneSummary};
