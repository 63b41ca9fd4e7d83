//! HuggingFace text-to-image inference.

mod client;

pub use client::HuggingFaceImageClient;
