//! Backend clients for Storyboard, each behind its own feature flag.
//!
//! - **Gemini** text generation (`gemini` feature), used for scene decomposition
//! - **HuggingFace** text-to-image inference (`huggingface` feature), used for scene rendering
//!
//! Clients own their credentials and transport. The pipeline only sees them
//! through [`storyboard_interface::TextBackend`] and
//! [`storyboard_interface::ImageBackend`].
//!
//! ```no_run
//! # #[cfg(all(feature = "gemini", feature = "huggingface"))]
//! # {
//! use storyboard_models::{GeminiClient, HuggingFaceImageClient};
//! use storyboard_rate_limit::StoryboardConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoryboardConfig::load()?;
//! let text = GeminiClient::from_config(&config)?;
//! let image = HuggingFaceImageClient::from_config(&config)?;
//! # Ok(())
//! # }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "gemini")]
mod gemini;
#[cfg(feature = "huggingface")]
mod huggingface;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiClient, TieredGemini};
#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceImageClient;
