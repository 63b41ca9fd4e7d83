//! Google Gemini client with per-model rate limiting.
//!
//! A [`GeminiClient`] keeps one rate-limited `gemini_rust::Gemini` client per
//! model, created on first use. Each model's quotas come from the configured
//! tier with model-specific overrides applied.

use async_trait::async_trait;
use gemini_rust::generation::model::{BlockReason, FinishReason, GenerationResponse};
use gemini_rust::{Gemini, client::Model};
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use storyboard_core::{GenerateRequest, GenerateResponse, Output, Role};
use storyboard_error::{BackendError, BackendErrorKind, StoryboardError, StoryboardResult};
use storyboard_interface::TextBackend;
use storyboard_rate_limit::{RateLimiter, RetryConfig, StoryboardConfig, Tier, TierConfig};
use tracing::{debug, instrument, warn};

/// Environment variable holding the Gemini API key.
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Couples a Gemini client with the tier that limits it.
#[derive(Clone)]
pub struct TieredGemini<T: Tier> {
    /// The Gemini API client
    pub client: Gemini,
    /// Quotas for this client
    pub tier: T,
}

impl<T: Tier + std::fmt::Debug> std::fmt::Debug for TieredGemini<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredGemini")
            .field("tier", &self.tier)
            .finish_non_exhaustive()
    }
}

impl<T: Tier> Tier for TieredGemini<T> {
    fn rpm(&self) -> Option<u32> {
        self.tier.rpm()
    }

    fn rpd(&self) -> Option<u32> {
        self.tier.rpd()
    }

    fn max_concurrent(&self) -> Option<u32> {
        self.tier.max_concurrent()
    }

    fn name(&self) -> &str {
        self.tier.name()
    }
}

type ClientPool = HashMap<String, RateLimiter<TieredGemini<TierConfig>>>;

/// Gemini text backend.
pub struct GeminiClient {
    clients: Arc<Mutex<ClientPool>>,
    api_key: String,
    model_name: String,
    base_tier: TierConfig,
    retry: RetryConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.clients.lock().map(|c| c.len()).unwrap_or_default();
        f.debug_struct("GeminiClient")
            .field("model_name", &self.model_name)
            .field("base_tier", &self.base_tier.name())
            .field("cached_clients", &cached)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client for `model_name`, reading the key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if the variable is unset or blank.
    #[instrument(name = "gemini_client_new", skip_all, fields(model = %model_name.as_ref()))]
    pub fn new(model_name: impl AsRef<str>) -> StoryboardResult<Self> {
        let api_key = Self::api_key_from_env()?;
        Ok(Self::with_api_key(api_key, model_name.as_ref()))
    }

    /// Create a client with an explicit key and the bundled free-tier quotas.
    pub fn with_api_key(api_key: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            api_key: api_key.into(),
            model_name: model_name.into(),
            base_tier: Self::fallback_tier(),
            retry: RetryConfig::default(),
        }
    }

    /// Create a client from loaded configuration.
    ///
    /// Uses `pipeline.text_model`, the default Gemini tier and the `[retry]`
    /// table. The key is read from `GEMINI_API_KEY`.
    #[instrument(name = "gemini_client_from_config", skip_all)]
    pub fn from_config(config: &StoryboardConfig) -> StoryboardResult<Self> {
        let api_key = Self::api_key_from_env()?;
        let tier = config
            .get_tier("gemini", None)
            .unwrap_or_else(Self::fallback_tier);

        Ok(Self::with_api_key(api_key, config.pipeline.text_model().as_str())
            .with_tier(tier)
            .with_retry(config.retry.clone()))
    }

    /// Replace the quota tier.
    pub fn with_tier(mut self, tier: TierConfig) -> Self {
        self.base_tier = tier;
        self.clear_pool();
        self
    }

    /// Replace the transport retry settings.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self.clear_pool();
        self
    }

    fn clear_pool(&self) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.clear();
        }
    }

    fn api_key_from_env() -> StoryboardResult<String> {
        env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                BackendError::new(BackendErrorKind::MissingCredentials(API_KEY_VAR.to_string()))
                    .into()
            })
    }

    fn fallback_tier() -> TierConfig {
        TierConfig {
            name: "Free".to_string(),
            rpm: Some(15),
            rpd: Some(1500),
            max_concurrent: Some(1),
            models: HashMap::new(),
        }
    }

    /// Map a model name to the SDK's model enum, adding the `models/` prefix.
    fn model_name_to_enum(name: &str) -> Model {
        match name {
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            other if other.starts_with("models/") => Model::Custom(other.to_string()),
            other => Model::Custom(format!("models/{}", other)),
        }
    }

    fn client_for(&self, model_name: &str) -> StoryboardResult<RateLimiter<TieredGemini<TierConfig>>> {
        let mut clients = self.clients.lock().map_err(|_| {
            BackendError::new(BackendErrorKind::Unavailable(
                "Gemini client pool poisoned".to_string(),
            ))
        })?;

        if let Some(existing) = clients.get(model_name) {
            return Ok(existing.clone());
        }

        let client = Gemini::with_model(&self.api_key, Self::model_name_to_enum(model_name))
            .map_err(|e| {
                BackendError::new(BackendErrorKind::Rejected {
                    status: 0,
                    message: format!("Failed to create Gemini client: {}", e),
                })
            })?;

        let tiered = TieredGemini {
            client,
            tier: self.base_tier.for_model(model_name),
        };
        let limiter = RateLimiter::new_with_retry(tiered, self.retry.clone());
        clients.insert(model_name.to_string(), limiter.clone());
        debug!(model = model_name, "Created rate-limited Gemini client");

        Ok(limiter)
    }

    #[instrument(skip(self, req), fields(model = tracing::field::Empty))]
    async fn generate_internal(&self, req: &GenerateRequest) -> StoryboardResult<GenerateResponse> {
        let model_name = req.model().clone().unwrap_or_else(|| self.model_name.clone());
        tracing::Span::current().record("model", model_name.as_str());

        let limited = self.client_for(&model_name)?;
        let messages = req.messages().clone();
        let temperature = *req.temperature();
        let max_tokens = *req.max_tokens();

        let response = limited
            .execute(|| async {
                let client = &limited.inner().client;
                let mut builder = client.generate_content();
                let mut system_prompt = None;

                for msg in &messages {
                    match msg.role {
                        Role::System => system_prompt = Some(msg.content.clone()),
                        Role::User => builder = builder.with_user_message(&msg.content),
                        Role::Assistant => builder = builder.with_model_message(&msg.content),
                    }
                }

                if let Some(prompt) = &system_prompt {
                    builder = builder.with_system_prompt(prompt);
                }

                if let Some(temp) = temperature {
                    builder = builder.with_temperature(temp);
                }

                if let Some(max_tok) = max_tokens {
                    builder = builder.with_max_output_tokens(max_tok as i32);
                }

                builder
                    .execute()
                    .await
                    .map_err(|e| StoryboardError::from(Self::parse_gemini_error(e)))
            })
            .await?;

        Self::check_finish_reason(&response)?;

        let text = response.text();
        debug!(chars = text.len(), "Gemini response received");

        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    /// Reject responses the model stopped for policy reasons.
    ///
    /// A blocked prompt arrives without candidates, so `prompt_feedback` is
    /// checked before the first candidate's finish reason.
    fn check_finish_reason(response: &GenerationResponse) -> Result<(), BackendError> {
        let blocked = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref());

        if let Some(
            block @ (BlockReason::Safety
            | BlockReason::Blocklist
            | BlockReason::ProhibitedContent
            | BlockReason::ImageSafety
            | BlockReason::Other),
        ) = blocked
        {
            warn!(reason = ?block, "Gemini blocked the prompt");
            return Err(BackendError::new(BackendErrorKind::ContentRejected(format!(
                "Gemini blocked the prompt: {:?}",
                block
            ))));
        }

        let reason = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_ref());

        match reason {
            Some(
                FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
                | FinishReason::Spii
                | FinishReason::ImageSafety,
            ) => {
                warn!(reason = ?reason, "Gemini refused the request");
                Err(BackendError::new(BackendErrorKind::ContentRejected(format!(
                    "Gemini stopped with finish reason {:?}",
                    reason
                ))))
            }
            _ => Ok(()),
        }
    }

    /// Convert an SDK error into a backend error, classifying by HTTP status when present.
    fn parse_gemini_error(err: impl std::fmt::Display) -> BackendError {
        let message = err.to_string();

        match Self::extract_status_code(&message) {
            Some(status) => BackendError::new(BackendErrorKind::from_status(status, message)),
            None => BackendError::new(BackendErrorKind::Unavailable(message)),
        }
    }

    /// Parse the status out of messages like "bad response from server; code 503; ...".
    fn extract_status_code(error_msg: &str) -> Option<u16> {
        let code_start = error_msg.find("code ")?;
        let digits: String = error_msg[code_start + 5..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

#[async_trait]
impl TextBackend for GeminiClient {
    async fn generate(&self, req: &GenerateRequest) -> StoryboardResult<GenerateResponse> {
        self.generate_internal(req).await
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    /// Default model, used when a request does not name one.
    fn model_name(&self) -> &str {
        &self.model_name
    }
}
