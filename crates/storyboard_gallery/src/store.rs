//! Process-wide run gallery.

use std::sync::Arc;
use storyboard_core::{Run, RunId, SceneResult};
use storyboard_error::{GalleryError, GalleryErrorKind, StoryboardResult};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Holds runs in the order they were first recorded.
///
/// Cloning the store clones the handle; every clone sees the same runs. The
/// orchestrator is the only writer, any number of readers may hold clones.
///
/// # Examples
///
/// ```
/// use storyboard_core::{Run, StoryInput};
/// use storyboard_gallery::GalleryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gallery = GalleryStore::new();
/// let run = Run::new(StoryInput::new("A fox and a crow.").unwrap());
/// let id = *run.id();
///
/// gallery.record(run).await;
/// assert_eq!(gallery.len().await, 1);
/// assert_eq!(gallery.latest().await.map(|r| *r.id()), Some(id));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    runs: Arc<RwLock<Vec<Run>>>,
    max_runs: Option<usize>,
}

impl GalleryStore {
    /// An empty gallery with unlimited retention.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty gallery keeping at most `max_runs` runs.
    ///
    /// A limit of zero is treated as one.
    pub fn with_max_runs(max_runs: usize) -> Self {
        Self {
            runs: Arc::default(),
            max_runs: Some(max_runs.max(1)),
        }
    }

    /// Retention limit, if any.
    pub fn max_runs(&self) -> Option<usize> {
        self.max_runs
    }

    /// Insert a run, or overwrite the stored copy with the same id.
    ///
    /// New runs beyond the retention limit evict the oldest runs.
    #[instrument(skip(self, run), fields(run_id = %run.id(), status = %run.status()))]
    pub async fn record(&self, run: Run) {
        let mut runs = self.runs.write().await;

        if let Some(existing) = runs.iter_mut().find(|r| r.id() == run.id()) {
            *existing = run;
            debug!("Updated recorded run");
            return;
        }

        runs.push(run);
        debug!(total = runs.len(), "Recorded new run");

        if let Some(limit) = self.max_runs.filter(|limit| runs.len() > *limit) {
            let excess = runs.len() - limit;
            let evicted: Vec<RunId> = runs.drain(..excess).map(|r| *r.id()).collect();
            info!(?evicted, "Evicted runs beyond retention limit");
        }
    }

    /// Snapshot of every run, oldest first.
    pub async fn all(&self) -> Vec<Run> {
        self.runs.read().await.clone()
    }

    /// Snapshot of the most recently recorded run.
    pub async fn latest(&self) -> Option<Run> {
        self.runs.read().await.last().cloned()
    }

    /// Snapshot of one run.
    pub async fn get(&self, run_id: &RunId) -> Option<Run> {
        self.runs.read().await.iter().find(|r| r.id() == run_id).cloned()
    }

    /// Snapshot of one scene.
    ///
    /// # Errors
    ///
    /// Returns `RunNotFound` or `SceneNotFound`.
    pub async fn scene(&self, run_id: &RunId, index: usize) -> StoryboardResult<SceneResult> {
        let runs = self.runs.read().await;
        let run = runs
            .iter()
            .find(|r| r.id() == run_id)
            .ok_or_else(|| GalleryError::new(GalleryErrorKind::RunNotFound(run_id.to_string())))?;

        run.scene(index).cloned().ok_or_else(|| {
            GalleryError::new(GalleryErrorKind::SceneNotFound {
                run_id: run_id.to_string(),
                index,
            })
            .into()
        })
    }

    /// Replace one scene of a finished run with a newer attempt.
    ///
    /// Returns a snapshot of the updated run.
    ///
    /// # Errors
    ///
    /// Returns `RunNotFound`, `SceneNotFound`, or `RunInProgress` if the run
    /// has not finished rendering.
    #[instrument(skip(self, result), fields(run_id = %run_id, index = result.index()))]
    pub async fn replace_scene(&self, run_id: &RunId, result: SceneResult) -> StoryboardResult<Run> {
        let mut runs = self.runs.write().await;
        let run = runs
            .iter_mut()
            .find(|r| r.id() == run_id)
            .ok_or_else(|| GalleryError::new(GalleryErrorKind::RunNotFound(run_id.to_string())))?;

        run.replace_scene(result)?;
        debug!(status = %run.status(), "Replaced scene");
        Ok(run.clone())
    }

    /// Number of recorded runs.
    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Whether no runs are recorded.
    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }

    /// Remove every run.
    #[instrument(skip(self))]
    pub async fn reset(&self) {
        let mut runs = self.runs.write().await;
        info!(cleared = runs.len(), "Resetting gallery");
        runs.clear();
    }

    /// Base64 of a scene image; see [`crate::encode_for_download`].
    pub fn encode_for_download(scene: &SceneResult) -> StoryboardResult<String> {
        crate::encode_for_download(scene)
    }
}
