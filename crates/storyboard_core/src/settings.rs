//! Pipeline and image rendering settings.
//!
//! Both structs deserialize from the `[pipeline]` and `[image]` tables of
//! `storyboard.toml`; missing keys fall back to the defaults below.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

fn default_text_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_story_chars() -> usize {
    20_000
}

fn default_backend_timeout_secs() -> u64 {
    120
}

fn default_cache_decompositions() -> bool {
    true
}

fn default_max_cached_stories() -> usize {
    32
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

/// Settings for the decomposition stage and per-call backend limits.
///
/// # Examples
///
/// ```
/// use storyboard_core::PipelineConfig;
///
/// let config = PipelineConfig::default().with_max_story_chars(500);
/// assert_eq!(*config.max_story_chars(), 500);
/// assert_eq!(config.text_model(), "gemini-1.5-flash");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct PipelineConfig {
    /// Model used for scene decomposition
    #[serde(default = "default_text_model")]
    #[setters(into)]
    text_model: String,

    /// Sampling temperature for decomposition
    #[serde(default = "default_temperature")]
    temperature: f32,

    /// Output token ceiling for decomposition
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Longest story accepted, in characters
    #[serde(default = "default_max_story_chars")]
    max_story_chars: usize,

    /// Timeout applied to each backend call
    #[serde(default = "default_backend_timeout_secs")]
    backend_timeout_secs: u64,

    /// Reuse decompositions of identical story text
    #[serde(default = "default_cache_decompositions")]
    cache_decompositions: bool,

    /// Most stories the decomposition cache holds before evicting
    #[serde(default = "default_max_cached_stories")]
    max_cached_stories: usize,

    /// Seconds a cached decomposition stays valid
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_story_chars: default_max_story_chars(),
            backend_timeout_secs: default_backend_timeout_secs(),
            cache_decompositions: default_cache_decompositions(),
            max_cached_stories: default_max_cached_stories(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl PipelineConfig {
    /// Per-call backend timeout.
    pub fn backend_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.backend_timeout_secs)
    }

    /// How long a cached decomposition stays valid.
    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }
}

fn default_image_model() -> String {
    "black-forest-labs/FLUX.1-schnell".to_string()
}

fn default_width() -> u32 {
    1024
}

fn default_height() -> u32 {
    576
}

fn default_inference_steps() -> u32 {
    4
}

/// Parameters for every image synthesis request in a run.
///
/// `seed = None` lets the backend randomize each scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ImageSettings {
    /// Image model identifier
    #[serde(default = "default_image_model")]
    #[setters(into)]
    model: String,

    /// Output width in pixels
    #[serde(default = "default_width")]
    width: u32,

    /// Output height in pixels
    #[serde(default = "default_height")]
    height: u32,

    /// Diffusion steps
    #[serde(default = "default_inference_steps")]
    num_inference_steps: u32,

    /// Fixed seed, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[setters(strip_option)]
    seed: Option<u64>,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            width: default_width(),
            height: default_height(),
            num_inference_steps: default_inference_steps(),
            seed: None,
        }
    }
}
