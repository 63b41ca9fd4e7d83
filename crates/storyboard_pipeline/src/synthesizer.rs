//! Rendering one scene prompt with an image backend.

use crate::deadline::with_deadline;
use std::time::Duration;
use storyboard_core::{ImageRequest, ImageSettings, RenderedImage, ScenePrompt};
use storyboard_error::{
    BackendError, BackendErrorKind, BuilderError, BuilderErrorKind, StoryboardResult,
    ValidationError,
};
use storyboard_interface::ImageBackend;
use tracing::{debug, instrument};

/// Default per-call deadline for image backends.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Sends one scene prompt per call to an image backend.
///
/// Not idempotent: the backend is generative, so the same prompt may come
/// back as different bytes.
pub struct ImageSynthesizer<I: ImageBackend> {
    backend: I,
    settings: ImageSettings,
    timeout: Duration,
}

impl<I: ImageBackend> ImageSynthesizer<I> {
    /// Create a synthesizer with [`DEFAULT_RENDER_TIMEOUT`].
    pub fn new(backend: I, settings: ImageSettings) -> Self {
        Self {
            backend,
            settings,
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// Override the per-call deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying image backend.
    pub fn backend(&self) -> &I {
        &self.backend
    }

    /// Rendering parameters.
    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Render a scene's `raw_prompt` into encoded image bytes.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for an empty prompt, before any request is sent
    /// - `BackendError` as reported by the backend (`Unavailable`,
    ///   `ContentRejected`, `QuotaExceeded`, ...), `Timeout` past the
    ///   deadline, or `InvalidResponse` for an empty image body
    #[instrument(
        skip(self, prompt),
        fields(
            provider = self.backend.provider_name(),
            model = self.backend.model_name(),
            index = *prompt.index()
        )
    )]
    pub async fn synthesize(&self, prompt: &ScenePrompt) -> StoryboardResult<RenderedImage> {
        if prompt.raw_prompt().trim().is_empty() {
            return Err(ValidationError::new(format!(
                "scene {} has an empty rendering prompt",
                prompt.index() + 1
            ))
            .into());
        }

        let request = self.build_request(prompt)?;
        let image = with_deadline(self.timeout, self.backend.render(&request)).await?;

        if image.data.is_empty() {
            return Err(BackendError::new(BackendErrorKind::InvalidResponse(
                "image backend returned an empty body".to_string(),
            ))
            .into());
        }

        debug!(bytes = image.data.len(), mime = ?image.mime, "Scene rendered");
        Ok(image)
    }

    fn build_request(&self, prompt: &ScenePrompt) -> StoryboardResult<ImageRequest> {
        let request = ImageRequest::builder()
            .prompt(prompt.raw_prompt().clone())
            .width(*self.settings.width())
            .height(*self.settings.height())
            .num_inference_steps(*self.settings.num_inference_steps())
            .seed(*self.settings.seed())
            .model(Some(self.settings.model().clone()))
            .build()
            .map_err(|e| BuilderError::new(BuilderErrorKind::Image, e))?;
        Ok(request)
    }
}
