//! Configuration, rate limiting and transport retry for Storyboard.
//!
//! - [`StoryboardConfig`] loads layered TOML configuration (bundled defaults,
//!   then `~/.config/storyboard/storyboard.toml`, then `./storyboard.toml`).
//! - [`RateLimiter`] wraps a backend client and enforces per-tier request
//!   quotas with `governor`, retrying transient failures with `tokio-retry2`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod tier;

pub use config::{
    GalleryConfig, ModelTierConfig, ProviderConfig, RetryConfig, StoryboardConfig, TierConfig,
};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use tier::Tier;
