//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (`include_str!` of `storyboard.toml`)
//! - `~/.config/storyboard/storyboard.toml`
//! - `./storyboard.toml`

use crate::Tier;
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use storyboard_core::{ImageSettings, PipelineConfig};
use storyboard_error::{ConfigError, StoryboardError, StoryboardResult};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../storyboard.toml");

/// Model-specific quota overrides.
///
/// ```toml
/// [providers.gemini.tiers.free.models."gemini-1.5-pro"]
/// rpm = 2
/// rpd = 50
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ModelTierConfig {
    /// Requests per minute (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,

    /// Requests per day (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpd: Option<u32>,

    /// Maximum concurrent requests (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

/// Quotas for one provider account tier.
///
/// ```toml
/// [providers.gemini.tiers.free]
/// name = "Free"
/// rpm = 15
/// rpd = 1500
/// max_concurrent = 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TierConfig {
    /// Display name of the tier
    pub name: String,

    /// Requests per minute
    #[serde(default)]
    pub rpm: Option<u32>,

    /// Requests per day
    #[serde(default)]
    pub rpd: Option<u32>,

    /// Maximum concurrent requests
    #[serde(default)]
    pub max_concurrent: Option<u32>,

    /// Model-specific overrides
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub models: HashMap<String, ModelTierConfig>,
}

impl Tier for TierConfig {
    fn rpm(&self) -> Option<u32> {
        self.rpm
    }

    fn rpd(&self) -> Option<u32> {
        self.rpd
    }

    fn max_concurrent(&self) -> Option<u32> {
        self.max_concurrent
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TierConfig {
    /// This tier with any overrides for `model_name` applied.
    pub fn for_model(&self, model_name: &str) -> TierConfig {
        match self.models.get(model_name) {
            Some(model) => TierConfig {
                name: self.name.clone(),
                rpm: model.rpm.or(self.rpm),
                rpd: model.rpd.or(self.rpd),
                max_concurrent: model.max_concurrent.or(self.max_concurrent),
                models: HashMap::new(),
            },
            None => self.clone(),
        }
    }
}

/// Tiers available for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Tier used when none is requested
    pub default_tier: String,

    /// Tier name to quotas
    pub tiers: HashMap<String, TierConfig>,
}

fn default_retry_enabled() -> bool {
    true
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_backoff_ms() -> u64 {
    2000
}

fn default_max_delay_secs() -> u64 {
    30
}

/// Transport retry for transient backend failures.
///
/// Only unavailable and timed-out calls are retried; quota and content
/// rejections surface immediately.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct RetryConfig {
    /// Whether transient failures are retried at all
    #[serde(default = "default_retry_enabled")]
    enabled: bool,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    max_retries: usize,

    /// First backoff delay in milliseconds, doubled per retry
    #[serde(default = "default_initial_backoff_ms")]
    initial_backoff_ms: u64,

    /// Ceiling on a single backoff delay, in seconds
    #[serde(default = "default_max_delay_secs")]
    max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_retry_enabled(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Override the retry count.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the initial backoff.
    pub fn with_initial_backoff_ms(mut self, initial_backoff_ms: u64) -> Self {
        self.initial_backoff_ms = initial_backoff_ms;
        self
    }
}

/// Gallery retention and export settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default, Getters)]
pub struct GalleryConfig {
    /// Keep at most this many runs; oldest are evicted first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_runs: Option<usize>,

    /// Default directory for on-disk export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,
}

/// Top-level Storyboard configuration.
///
/// # Example
///
/// ```no_run
/// use storyboard_rate_limit::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// let tier = config.get_tier("gemini", None).unwrap();
/// println!("Gemini default tier RPM: {:?}", tier.rpm);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct StoryboardConfig {
    /// Provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Decomposition stage settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Image rendering settings
    #[serde(default)]
    pub image: ImageSettings,

    /// Transport retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Gallery settings
    #[serde(default)]
    pub gallery: GalleryConfig,
}

impl StoryboardConfig {
    /// Load configuration from a specific file, ignoring the layered sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load the bundled defaults merged with user overrides.
    ///
    /// User files are optional and skipped when absent.
    #[instrument]
    pub fn load() -> StoryboardResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyboard").required(false));

        Self::finish(builder)
    }

    /// Load the bundled defaults merged with one explicit override file.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file is missing or invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_with_override(path: impl AsRef<std::path::Path>) -> StoryboardResult<Self> {
        debug!("Loading bundled defaults with explicit override");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));

        Self::finish(builder)
    }

    /// The bundled defaults alone.
    pub fn bundled() -> StoryboardResult<Self> {
        Self::finish(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> StoryboardResult<Self> {
        builder
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Tier configuration for a provider, using its default tier when `tier_name` is `None`.
    #[instrument(skip(self))]
    pub fn get_tier(&self, provider: &str, tier_name: Option<&str>) -> Option<TierConfig> {
        let provider_config = self.providers.get(provider)?;

        let tier = tier_name.unwrap_or(&provider_config.default_tier);

        debug!(provider, tier, "Looking up tier configuration");

        provider_config.tiers.get(tier).cloned()
    }
}
