//! Tracing subscriber setup for the binary.

use storyboard_error::{ConfigError, StoryboardResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Filter directives for the given verbosity.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` applies, falling back
/// to `info`.
pub fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns a configuration error if a global subscriber is already set.
pub fn init_tracing(verbose: bool, format: LogFormat) -> StoryboardResult<()> {
    let registry = tracing_subscriber::registry().with(env_filter(verbose));

    let result = match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true),
            )
            .try_init(),
    };

    result.map_err(|e| ConfigError::new(format!("Failed to initialise logging: {}", e)).into())
}
