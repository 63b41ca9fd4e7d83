//! Per-scene generation outcomes.

use crate::{RenderedImage, ScenePrompt};
use serde::{Deserialize, Serialize};

/// Observable status of a scene.
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
#[serde(rename_all = "snake_case")]
pub enum SceneStatus {
    /// Not attempted yet
    #[display("pending")]
    Pending,
    /// Image rendered
    #[display("succeeded")]
    Succeeded,
    /// Synthesis failed; see `error_detail`
    #[display("failed")]
    Failed,
    /// Run was cancelled before this scene was attempted
    #[display("cancelled")]
    Cancelled,
}

/// What happened to a scene.
///
/// The image exists only on success and the error detail only on failure,
/// so those invariants hold by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SceneOutcome {
    /// Not attempted yet
    Pending,
    /// Image rendered
    Succeeded {
        /// The rendered image
        image: RenderedImage,
    },
    /// Synthesis failed
    Failed {
        /// Human-readable failure description
        error_detail: String,
    },
    /// Not attempted because the run was cancelled
    Cancelled,
}

impl SceneOutcome {
    /// Status tag for this outcome.
    pub fn status(&self) -> SceneStatus {
        match self {
            SceneOutcome::Pending => SceneStatus::Pending,
            SceneOutcome::Succeeded { .. } => SceneStatus::Succeeded,
            SceneOutcome::Failed { .. } => SceneStatus::Failed,
            SceneOutcome::Cancelled => SceneStatus::Cancelled,
        }
    }
}

/// A scene prompt paired with its generation outcome.
///
/// Results move out of `Pending` exactly once. A retry builds a fresh result
/// via [`SceneResult::reattempt`] that replaces the old one; the old value is
/// never edited in place.
///
/// # Examples
///
/// ```
/// use storyboard_core::{RenderedImage, ScenePrompt, SceneResult, SceneStatus};
///
/// let prompt = ScenePrompt::new(3, "The crow sings", vec![], "cartoon", None);
/// let pending = SceneResult::pending(prompt);
/// assert_eq!(pending.status(), SceneStatus::Pending);
/// assert_eq!(*pending.attempt_count(), 0);
///
/// let done = pending.into_succeeded(RenderedImage::new(vec![1, 2, 3], None));
/// assert_eq!(done.status(), SceneStatus::Succeeded);
/// assert_eq!(done.image_bytes(), Some(&[1u8, 2, 3][..]));
/// assert_eq!(*done.attempt_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct SceneResult {
    /// The prompt this result belongs to
    prompt: ScenePrompt,
    /// Generation outcome
    outcome: SceneOutcome,
    /// Number of synthesis attempts made for this scene
    attempt_count: u32,
}

impl SceneResult {
    /// A result awaiting its first synthesis attempt.
    pub fn pending(prompt: ScenePrompt) -> Self {
        Self {
            prompt,
            outcome: SceneOutcome::Pending,
            attempt_count: 0,
        }
    }

    /// A fresh pending result for the same prompt, keeping the attempt history.
    pub fn reattempt(&self) -> Self {
        Self {
            prompt: self.prompt.clone(),
            outcome: SceneOutcome::Pending,
            attempt_count: self.attempt_count,
        }
    }

    /// Scene index within the run.
    pub fn index(&self) -> usize {
        *self.prompt.index()
    }

    /// Status derived from the outcome.
    pub fn status(&self) -> SceneStatus {
        self.outcome.status()
    }

    /// Whether the scene has left `Pending`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.outcome, SceneOutcome::Pending)
    }

    /// The rendered image, present iff succeeded.
    pub fn image(&self) -> Option<&RenderedImage> {
        match &self.outcome {
            SceneOutcome::Succeeded { image } => Some(image),
            _ => None,
        }
    }

    /// Raw image bytes, present iff succeeded.
    pub fn image_bytes(&self) -> Option<&[u8]> {
        self.image().map(|image| image.data.as_slice())
    }

    /// Failure description, present iff failed.
    pub fn error_detail(&self) -> Option<&str> {
        match &self.outcome {
            SceneOutcome::Failed { error_detail } => Some(error_detail),
            _ => None,
        }
    }

    /// Record a successful synthesis attempt.
    pub fn into_succeeded(self, image: RenderedImage) -> Self {
        Self {
            prompt: self.prompt,
            outcome: SceneOutcome::Succeeded { image },
            attempt_count: self.attempt_count + 1,
        }
    }

    /// Record a failed synthesis attempt.
    pub fn into_failed(self, error_detail: impl Into<String>) -> Self {
        let mut error_detail = error_detail.into();
        if error_detail.trim().is_empty() {
            error_detail = "image synthesis failed without detail".to_string();
        }
        Self {
            prompt: self.prompt,
            outcome: SceneOutcome::Failed { error_detail },
            attempt_count: self.attempt_count + 1,
        }
    }

    /// Mark the scene as skipped by cancellation.
    pub fn into_cancelled(self) -> Self {
        Self {
            prompt: self.prompt,
            outcome: SceneOutcome::Cancelled,
            attempt_count: self.attempt_count,
        }
    }
}
