//! HuggingFace Inference API image client using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use storyboard_core::{ImageRequest, RenderedImage};
use storyboard_error::{BackendError, BackendErrorKind, StoryboardError, StoryboardResult};
use storyboard_interface::ImageBackend;
use storyboard_rate_limit::{RateLimiter, RetryConfig, StoryboardConfig, TierConfig};
use tracing::{debug, error, instrument};

/// Environment variables checked for the HuggingFace token, in order.
const TOKEN_VARS: [&str; 2] = ["HF_TOKEN", "HUGGINGFACE_API_TOKEN"];

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HuggingFace text-to-image backend.
///
/// Sends `{"inputs": prompt, "parameters": {...}}` with a bearer token and
/// returns the response body as image bytes.
#[derive(Clone)]
pub struct HuggingFaceImageClient {
    client: Client,
    api_token: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
    limiter: RateLimiter<TierConfig>,
}

impl std::fmt::Debug for HuggingFaceImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceImageClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl HuggingFaceImageClient {
    /// Create a client for `model`, reading the token from `HF_TOKEN` or
    /// `HUGGINGFACE_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if neither variable is set.
    #[instrument(skip_all, fields(model = %model.as_ref()))]
    pub fn new(model: impl AsRef<str>) -> StoryboardResult<Self> {
        let api_token = Self::token_from_env()?;
        Self::with_api_token(api_token, model.as_ref())
    }

    /// Create a client with an explicit token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip(api_token, model))]
    pub fn with_api_token(
        api_token: impl Into<String>,
        model: impl Into<String>,
    ) -> StoryboardResult<Self> {
        let model = model.into();
        let client = Self::http_client(DEFAULT_TIMEOUT_SECS)?;

        debug!(model = %model, "Created HuggingFace image client");

        Ok(Self {
            client,
            api_token: api_token.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            limiter: RateLimiter::new(Self::fallback_tier()),
        })
    }

    /// Create a client from loaded configuration.
    ///
    /// Uses `image.model`, the default HuggingFace tier, the `[retry]` table
    /// and `pipeline.backend_timeout_secs` as the HTTP timeout.
    #[instrument(name = "huggingface_client_from_config", skip_all)]
    pub fn from_config(config: &StoryboardConfig) -> StoryboardResult<Self> {
        let tier = config
            .get_tier("huggingface", None)
            .unwrap_or_else(Self::fallback_tier);

        Ok(Self::new(config.image.model())?
            .with_timeout_secs(*config.pipeline.backend_timeout_secs())?
            .with_limits(tier, config.retry.clone()))
    }

    /// Point the client at a different inference endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the HTTP timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be rebuilt.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> StoryboardResult<Self> {
        self.client = Self::http_client(timeout_secs)?;
        self.timeout_secs = timeout_secs;
        Ok(self)
    }

    /// Replace the quota tier and retry settings.
    pub fn with_limits(mut self, tier: TierConfig, retry: RetryConfig) -> Self {
        self.limiter = RateLimiter::new_with_retry(tier.for_model(&self.model), retry);
        self
    }

    fn http_client(timeout_secs: u64) -> StoryboardResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                BackendError::new(BackendErrorKind::Unavailable(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
                .into()
            })
    }

    fn token_from_env() -> StoryboardResult<String> {
        TOKEN_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| {
                BackendError::new(BackendErrorKind::MissingCredentials(TOKEN_VARS.join(" or ")))
                    .into()
            })
    }

    fn fallback_tier() -> TierConfig {
        TierConfig {
            name: "Free".to_string(),
            rpm: Some(10),
            rpd: None,
            max_concurrent: Some(1),
            models: HashMap::new(),
        }
    }

    /// JSON body for one inference call.
    fn request_body(req: &ImageRequest) -> serde_json::Value {
        let mut parameters = json!({
            "width": req.width(),
            "height": req.height(),
            "num_inference_steps": req.num_inference_steps(),
        });
        if let Some(seed) = req.seed() {
            parameters["seed"] = json!(seed);
        }

        json!({
            "inputs": req.prompt(),
            "parameters": parameters,
        })
    }

    /// Classify a non-success response.
    fn classify_failure(status: u16, body: &str) -> BackendErrorKind {
        let lowered = body.to_lowercase();
        if lowered.contains("nsfw")
            || lowered.contains("safety")
            || lowered.contains("content policy")
        {
            return BackendErrorKind::ContentRejected(body.to_string());
        }
        BackendErrorKind::from_status(status, body)
    }

    fn transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::new(BackendErrorKind::Timeout(std::time::Duration::from_secs(self.timeout_secs)))
        } else {
            BackendError::new(BackendErrorKind::Unavailable(format!(
                "Request failed: {}",
                err
            )))
        }
    }

    async fn render_once(&self, url: &str, body: &serde_json::Value) -> Result<RenderedImage, BackendError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Accept", "image/png")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                self.transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_text, "HuggingFace API error");
            return Err(BackendError::new(Self::classify_failure(
                status.as_u16(),
                &error_text,
            )));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        if mime.as_deref().is_some_and(|m| !m.starts_with("image/")) {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::new(BackendErrorKind::InvalidResponse(format!(
                "expected image bytes, got {}: {}",
                mime.unwrap_or_default(),
                text
            ))));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        if bytes.is_empty() {
            return Err(BackendError::new(BackendErrorKind::InvalidResponse(
                "empty image body".to_string(),
            )));
        }

        debug!(bytes = bytes.len(), mime = ?mime, "Received image");
        Ok(RenderedImage::new(bytes.to_vec(), mime))
    }
}

#[async_trait]
impl ImageBackend for HuggingFaceImageClient {
    #[instrument(skip(self, req), fields(model = tracing::field::Empty))]
    async fn render(&self, req: &ImageRequest) -> StoryboardResult<RenderedImage> {
        let model = req.model().clone().unwrap_or_else(|| self.model.clone());
        tracing::Span::current().record("model", model.as_str());

        let url = format!("{}/{}", self.base_url, model);
        let body = Self::request_body(req);

        debug!(
            url = %url,
            prompt_len = req.prompt().len(),
            width = req.width(),
            height = req.height(),
            "Sending request to HuggingFace"
        );

        self.limiter
            .execute(|| async {
                self.render_once(&url, &body)
                    .await
                    .map_err(StoryboardError::from)
            })
            .await
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
