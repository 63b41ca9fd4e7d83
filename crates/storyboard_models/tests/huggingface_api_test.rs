#![cfg(feature = "huggingface")]

use storyboard_core::ImageRequest;
use storyboard_interface::ImageBackend;
use storyboard_models::HuggingFaceImageClient;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_huggingface_renders_image() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let client = HuggingFaceImageClient::new("black-forest-labs/FLUX.1-schnell")?;

    let request = ImageRequest::builder()
        .prompt("A red fox sitting under an oak tree. Style: storybook cartoon.")
        .width(512u32)
        .height(288u32)
        .num_inference_steps(4u32)
        .build()?;

    let image = client.render(&request).await?;

    assert!(!image.data.is_empty(), "Should receive image bytes");
    println!("Received {} bytes ({:?})", image.data.len(), image.mime);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() -> anyhow::Result<()> {
    use storyboard_error::BackendErrorKind;
    use storyboard_rate_limit::{RetryConfig, StoryboardConfig};

    let tier = StoryboardConfig::bundled()?
        .get_tier("huggingface", None)
        .ok_or_else(|| anyhow::anyhow!("bundled huggingface tier missing"))?;

    let client = HuggingFaceImageClient::with_api_token("hf_test", "test/model")?
        .with_base_url("http://127.0.0.1:9/models")
        .with_timeout_secs(2)?
        .with_limits(tier, RetryConfig::disabled());

    let request = ImageRequest::builder()
        .prompt("anything")
        .width(64u32)
        .height(64u32)
        .num_inference_steps(1u32)
        .build()?;

    let err = client.render(&request).await.unwrap_err();
    assert!(matches!(
        err.backend_kind(),
        Some(BackendErrorKind::Unavailable(_) | BackendErrorKind::Timeout(_))
    ));

    Ok(())
}
