//! The run aggregate and its progress events.

use crate::{SCENE_COUNT, ScenePrompt, SceneResult, SceneStatus, StoryInput};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyboard_error::{GalleryError, GalleryErrorKind, StoryboardResult, ValidationError};
use uuid::Uuid;

/// Stable identifier of a run.
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
#[display("{}", _0)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a new random run id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of a run.
///
/// `Created -> Decomposing -> Rendering -> {Completed | CompletedWithErrors}`,
/// or `Decomposing -> Aborted` when no scenes could be produced.
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
pub enum RunStatus {
    /// Accepted, nothing started
    #[display("created")]
    Created,
    /// Waiting on the text backend
    #[display("decomposing")]
    Decomposing,
    /// Rendering scenes one at a time
    #[display("rendering")]
    Rendering,
    /// Every scene succeeded
    #[display("completed")]
    Completed,
    /// At least one scene failed or was cancelled
    #[display("completed_with_errors")]
    CompletedWithErrors,
    /// Decomposition failed; no scenes exist
    #[display("aborted")]
    Aborted,
}

impl RunStatus {
    /// Whether the run can no longer change on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::CompletedWithErrors | RunStatus::Aborted
        )
    }
}

/// One end-to-end pipeline execution for a single story.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Run, RunStatus, StoryInput};
///
/// let mut run = Run::new(StoryInput::new("A short tale.").unwrap());
/// assert_eq!(*run.status(), RunStatus::Created);
///
/// run.begin_decomposition();
/// run.abort("backend unreachable");
/// assert_eq!(*run.status(), RunStatus::Aborted);
/// assert!(run.scenes().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Run {
    /// Run identifier
    id: RunId,
    /// Story this run illustrates
    story: StoryInput,
    /// When the run was accepted
    created_at: DateTime<Utc>,
    /// When the run reached a terminal status
    finished_at: Option<DateTime<Utc>>,
    /// Lifecycle status; terminal values are the completion status
    status: RunStatus,
    /// Scene results ordered by index
    scenes: Vec<SceneResult>,
    /// Run-level failure description (aborted runs)
    error_detail: Option<String>,
    /// Whether rendering stopped early on request
    cancelled: bool,
}

impl Run {
    /// Accept a story into a new run.
    pub fn new(story: StoryInput) -> Self {
        Self {
            id: RunId::new(),
            story,
            created_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Created,
            scenes: Vec::new(),
            error_detail: None,
            cancelled: false,
        }
    }

    /// Enter the decomposition stage.
    pub fn begin_decomposition(&mut self) {
        self.status = RunStatus::Decomposing;
    }

    /// Decomposition failed; the run ends without scenes.
    pub fn abort(&mut self, error_detail: impl Into<String>) {
        self.scenes.clear();
        self.error_detail = Some(error_detail.into());
        self.status = RunStatus::Aborted;
        self.finished_at = Some(Utc::now());
    }

    /// Enter the rendering stage with one pending result per prompt.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the prompts are exactly
    /// [`SCENE_COUNT`] entries with indices `0..SCENE_COUNT` in order.
    #[track_caller]
    pub fn begin_rendering(&mut self, prompts: Vec<ScenePrompt>) -> StoryboardResult<()> {
        if prompts.len() != SCENE_COUNT {
            return Err(ValidationError::new(format!(
                "a run needs exactly {} scenes, got {}",
                SCENE_COUNT,
                prompts.len()
            ))
            .into());
        }
        if let Some((position, prompt)) = prompts
            .iter()
            .enumerate()
            .find(|(position, prompt)| prompt.index() != position)
        {
            return Err(ValidationError::new(format!(
                "scene at position {} carries index {}",
                position,
                prompt.index()
            ))
            .into());
        }

        self.scenes = prompts.into_iter().map(SceneResult::pending).collect();
        self.status = RunStatus::Rendering;
        Ok(())
    }

    /// Store the terminal result of a pending scene.
    ///
    /// # Errors
    ///
    /// Fails if the index is unknown, the result is still pending, or the
    /// slot already holds a terminal result.
    #[track_caller]
    pub fn resolve_scene(&mut self, result: SceneResult) -> StoryboardResult<()> {
        let index = result.index();
        let run_id = self.id;
        let slot = self.slot_mut(index, run_id)?;

        if slot.is_terminal() {
            return Err(ValidationError::new(format!(
                "scene {} already resolved as {}",
                index,
                slot.status()
            ))
            .into());
        }
        if !result.is_terminal() {
            return Err(
                ValidationError::new(format!("scene {} resolved with a pending result", index))
                    .into(),
            );
        }

        *slot = result;
        Ok(())
    }

    /// Replace a scene of a finished run with a newer attempt.
    ///
    /// The completion status is recomputed afterwards.
    ///
    /// # Errors
    ///
    /// Fails if the run is still in progress or the index is unknown.
    #[track_caller]
    pub fn replace_scene(&mut self, result: SceneResult) -> StoryboardResult<()> {
        if !matches!(
            self.status,
            RunStatus::Completed | RunStatus::CompletedWithErrors
        ) {
            return Err(GalleryError::new(GalleryErrorKind::RunInProgress(self.id.to_string())).into());
        }
        if !result.is_terminal() {
            return Err(ValidationError::new(format!(
                "scene {} replaced with a pending result",
                result.index()
            ))
            .into());
        }

        let run_id = self.id;
        let slot = self.slot_mut(result.index(), run_id)?;
        *slot = result;
        self.settle();
        Ok(())
    }

    /// Mark every still-pending scene as cancelled.
    pub fn cancel_remaining(&mut self) {
        self.cancelled = true;
        self.scenes = std::mem::take(&mut self.scenes)
            .into_iter()
            .map(|scene| {
                if scene.is_terminal() {
                    scene
                } else {
                    scene.into_cancelled()
                }
            })
            .collect();
    }

    /// Close the rendering stage and compute the completion status.
    pub fn finish(&mut self) {
        self.settle();
        self.finished_at = Some(Utc::now());
    }

    /// Scenes that reached a terminal status.
    pub fn scenes_done(&self) -> usize {
        self.scenes.iter().filter(|s| s.is_terminal()).count()
    }

    /// Scenes with the given status.
    pub fn count_with_status(&self, status: SceneStatus) -> usize {
        self.scenes.iter().filter(|s| s.status() == status).count()
    }

    /// Look up a scene by index.
    pub fn scene(&self, index: usize) -> Option<&SceneResult> {
        self.scenes.get(index)
    }

    fn settle(&mut self) {
        let all_succeeded = self.scenes.len() == SCENE_COUNT
            && self
                .scenes
                .iter()
                .all(|s| s.status() == SceneStatus::Succeeded);
        self.status = if all_succeeded {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithErrors
        };
    }

    #[track_caller]
    fn slot_mut(&mut self, index: usize, run_id: RunId) -> StoryboardResult<&mut SceneResult> {
        self.scenes.get_mut(index).ok_or_else(|| {
            GalleryError::new(GalleryErrorKind::SceneNotFound {
                run_id: run_id.to_string(),
                index,
            })
            .into()
        })
    }
}

/// Progress emitted after each scene is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Run being rendered
    pub run_id: RunId,
    /// Index of the scene just processed
    pub index: usize,
    /// Scenes processed so far, including this one
    pub scenes_done: usize,
    /// Scenes in the run
    pub scenes_total: usize,
    /// Outcome of the scene just processed
    pub last_status: SceneStatus,
}
