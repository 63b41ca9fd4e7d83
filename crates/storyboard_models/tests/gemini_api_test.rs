#![cfg(feature = "gemini")]

use storyboard_core::{GenerateRequest, Message, Role};
use storyboard_interface::TextBackend;
use storyboard_models::GeminiClient;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_basic_generation() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let client = GeminiClient::new("gemini-1.5-flash")?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::new(Role::User, "Say hello in one word.")])
        .max_tokens(Some(10u32))
        .build()?;

    let response = client.generate(&request).await?;

    assert!(!response.text().trim().is_empty(), "Should receive text");
    println!("Response: {}", response.text());

    Ok(())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_gemini_system_prompt_and_model_override() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let client = GeminiClient::new("gemini-1.5-flash")?;

    let request = GenerateRequest::builder()
        .messages(vec![
            Message::new(Role::System, "Answer with a single number."),
            Message::new(Role::User, "What is two plus two?"),
        ])
        .model(Some("gemini-2.0-flash".to_string()))
        .temperature(Some(0.0f32))
        .build()?;

    let response = client.generate(&request).await?;
    assert!(response.text().contains('4'));

    Ok(())
}
