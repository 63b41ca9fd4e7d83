//! Request and response types exchanged with generation backends.

use serde::{Deserialize, Serialize};

/// Conversation participant roles understood by text backends.
///
/// # Examples
///
/// ```
/// use storyboard_core::Role;
///
/// assert_eq!(format!("{}", Role::System), "System");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// Instructions that frame the conversation
    System,
    /// Caller-authored content
    User,
    /// Model-authored content
    Assistant,
}

/// A single text message sent to a text backend.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Message, Role};
///
/// let message = Message::new(Role::User, "Split this story into scenes.");
/// assert_eq!(message.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Text generation request.
///
/// # Examples
///
/// ```
/// use storyboard_core::{GenerateRequest, Message, Role};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::new(Role::User, "Hello")])
///     .temperature(Some(0.4f32))
///     .build()
///     .unwrap();
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.max_tokens(), None);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct GenerateRequest {
    /// The conversation messages to send
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default)]
    temperature: Option<f32>,
    /// Model identifier override
    #[builder(default)]
    model: Option<String>,
}

impl GenerateRequest {
    /// Creates a new builder for `GenerateRequest`.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Outputs a text backend can return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output
    Text(String),
}

/// Unified text backend response.
///
/// # Examples
///
/// ```
/// use storyboard_core::{GenerateResponse, Output};
///
/// let response = GenerateResponse {
///     outputs: vec![Output::Text("part one ".into()), Output::Text("part two".into())],
/// };
/// assert_eq!(response.text(), "part one part two");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated outputs from the model
    pub outputs: Vec<Output>,
}

impl GenerateResponse {
    /// Concatenate every text output in order.
    pub fn text(&self) -> String {
        self.outputs
            .iter()
            .map(|o| match o {
                Output::Text(text) => text.as_str(),
            })
            .collect()
    }
}

/// Raw encoded image bytes as returned by an image backend.
///
/// The format is opaque to the pipeline; `mime` is kept when the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderedImage {
    /// Encoded image bytes (PNG, JPEG, ...)
    pub data: Vec<u8>,
    /// MIME type reported by the backend
    pub mime: Option<String>,
}

impl RenderedImage {
    /// Wrap raw bytes with an optional MIME type.
    pub fn new(data: Vec<u8>, mime: Option<String>) -> Self {
        Self { data, mime }
    }
}

/// Image generation request for a single scene.
///
/// # Examples
///
/// ```
/// use storyboard_core::ImageRequest;
///
/// let request = ImageRequest::builder()
///     .prompt("A fox under a tree. Style: cartoon.")
///     .width(1024u32)
///     .height(576u32)
///     .num_inference_steps(4u32)
///     .build()
///     .unwrap();
/// assert_eq!(*request.width(), 1024);
/// assert!(request.seed().is_none());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Rendering prompt
    prompt: String,
    /// Output width in pixels
    width: u32,
    /// Output height in pixels
    height: u32,
    /// Diffusion steps
    num_inference_steps: u32,
    /// Fixed seed; `None` lets the backend randomize
    #[builder(default)]
    seed: Option<u64>,
    /// Model identifier override
    #[builder(default)]
    model: Option<String>,
}

impl ImageRequest {
    /// Creates a new builder for `ImageRequest`.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}
