//! Configuration command handler.

use std::path::Path;
use storyboard::{ConfigError, StoryboardConfig, StoryboardResult};

/// Load the layered configuration, with an explicit file on top when given.
pub fn load_config(path: Option<&Path>) -> StoryboardResult<StoryboardConfig> {
    match path {
        Some(path) => StoryboardConfig::load_with_override(path),
        None => StoryboardConfig::load(),
    }
}

/// Print the effective configuration as TOML.
pub fn show_config(config: &StoryboardConfig) -> StoryboardResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::new(format!("Failed to render configuration: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
