//! The Storyboard generation pipeline.
//!
//! - [`SceneDecomposer`] turns a story into ten scene prompts with one text
//!   backend call.
//! - [`ImageSynthesizer`] renders one scene prompt with one image backend call.
//! - [`PipelineOrchestrator`] runs both stages, tolerates per-scene failures,
//!   reports progress, and records every run in a
//!   [`GalleryStore`](storyboard_gallery::GalleryStore).
//!
//! # Example
//!
//! ```rust,ignore
//! use storyboard_pipeline::{ImageSynthesizer, PipelineOrchestrator, SceneDecomposer};
//!
//! let orchestrator = PipelineOrchestrator::new(
//!     SceneDecomposer::new(text_backend, pipeline_config),
//!     ImageSynthesizer::new(image_backend, image_settings),
//!     GalleryStore::new(),
//! );
//! let run = orchestrator.run(StoryInput::new(story)?).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod deadline;
mod decomposer;
mod extraction;
mod orchestrator;
mod parser;
mod synthesizer;

pub use cache::{DEFAULT_CACHE_TTL, DEFAULT_MAX_CACHED_STORIES, DecompositionCache};
pub use decomposer::{SceneDecomposer, instruction};
pub use extraction::{extract_json, json_candidates};
pub use orchestrator::PipelineOrchestrator;
pub use parser::parse_scenes;
pub use synthesizer::{DEFAULT_RENDER_TIMEOUT, ImageSynthesizer};
