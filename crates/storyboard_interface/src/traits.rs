//! Trait definitions for text and image generation backends.

use async_trait::async_trait;
use std::sync::Arc;
use storyboard_core::{GenerateRequest, GenerateResponse, ImageRequest, RenderedImage};
use storyboard_error::StoryboardResult;

/// A text-generation backend used for scene decomposition.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Generate model output for a conversation.
    async fn generate(&self, req: &GenerateRequest) -> StoryboardResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gemini-1.5-flash").
    fn model_name(&self) -> &str;
}

/// An image-generation backend used for scene rendering.
///
/// Generative backends are not idempotent: repeat calls with the same
/// request may return different bytes.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Render one prompt into encoded image bytes.
    async fn render(&self, req: &ImageRequest) -> StoryboardResult<RenderedImage>;

    /// Provider name (e.g., "huggingface").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "black-forest-labs/FLUX.1-schnell").
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: TextBackend + ?Sized> TextBackend for Arc<T> {
    async fn generate(&self, req: &GenerateRequest) -> StoryboardResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: ImageBackend + ?Sized> ImageBackend for Arc<T> {
    async fn render(&self, req: &ImageRequest) -> StoryboardResult<RenderedImage> {
        (**self).render(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
