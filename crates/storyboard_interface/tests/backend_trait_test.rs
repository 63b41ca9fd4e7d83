use async_trait::async_trait;
use std::sync::Arc;
use storyboard_core::{
    GenerateRequest, GenerateResponse, ImageRequest, Message, Output, RenderedImage, Role,
};
use storyboard_error::StoryboardResult;
use storyboard_interface::{ImageBackend, TextBackend};

struct EchoText;

#[async_trait]
impl TextBackend for EchoText {
    async fn generate(&self, req: &GenerateRequest) -> StoryboardResult<GenerateResponse> {
        let text = req
            .messages()
            .iter()
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo-1"
    }
}

struct SolidImage;

#[async_trait]
impl ImageBackend for SolidImage {
    async fn render(&self, req: &ImageRequest) -> StoryboardResult<RenderedImage> {
        Ok(RenderedImage::new(req.prompt().as_bytes().to_vec(), None))
    }

    fn provider_name(&self) -> &'static str {
        "solid"
    }

    fn model_name(&self) -> &str {
        "solid-1"
    }
}

#[tokio::test]
async fn arc_wrapped_text_backend_delegates() {
    let backend: Arc<dyn TextBackend> = Arc::new(EchoText);
    let request = GenerateRequest::builder()
        .messages(vec![Message::new(Role::User, "hello")])
        .build()
        .unwrap();

    let response = backend.generate(&request).await.unwrap();
    assert_eq!(response.text(), "hello");
    assert_eq!(backend.provider_name(), "echo");
    assert_eq!(backend.model_name(), "echo-1");
}

#[tokio::test]
async fn arc_wrapped_image_backend_delegates() {
    let backend = Arc::new(SolidImage);
    let request = ImageRequest::builder()
        .prompt("a red fox")
        .width(64u32)
        .height(64u32)
        .num_inference_steps(1u32)
        .build()
        .unwrap();

    let image = ImageBackend::render(&backend, &request).await.unwrap();
    assert_eq!(image.data, b"a red fox".to_vec());
}
