//! End-to-end run execution.
//!
//! A run decomposes its story once, then renders the ten scenes strictly one
//! after another in index order. A failed scene is recorded and the run moves
//! on; only a failed decomposition ends a run early.

use crate::{ImageSynthesizer, SceneDecomposer};
use storyboard_core::{ProgressUpdate, Run, RunId, SceneResult, StoryInput};
use storyboard_error::{GalleryError, GalleryErrorKind, StoryboardError, StoryboardResult};
use storyboard_gallery::GalleryStore;
use storyboard_interface::{ImageBackend, TextBackend};
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Buffered progress updates per subscriber.
const PROGRESS_CAPACITY: usize = 64;

/// Drives runs from story text to a gallery entry.
///
/// The orchestrator is the gallery's only writer. It publishes the run when
/// rendering starts, after every scene, and when the run finishes, so
/// readers always see a whole snapshot. At most one run or scene retry
/// renders at a time per orchestrator.
pub struct PipelineOrchestrator<T: TextBackend, I: ImageBackend> {
    decomposer: SceneDecomposer<T>,
    synthesizer: ImageSynthesizer<I>,
    gallery: GalleryStore,
    progress: broadcast::Sender<ProgressUpdate>,
    worker: Mutex<()>,
}

impl<T: TextBackend, I: ImageBackend> PipelineOrchestrator<T, I> {
    /// Create an orchestrator writing into `gallery`.
    pub fn new(
        decomposer: SceneDecomposer<T>,
        synthesizer: ImageSynthesizer<I>,
        gallery: GalleryStore,
    ) -> Self {
        let (progress, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self {
            decomposer,
            synthesizer,
            gallery,
            progress,
            worker: Mutex::new(()),
        }
    }

    /// The gallery runs are recorded into.
    pub fn gallery(&self) -> &GalleryStore {
        &self.gallery
    }

    /// The scene decomposer.
    pub fn decomposer(&self) -> &SceneDecomposer<T> {
        &self.decomposer
    }

    /// The image synthesizer.
    pub fn synthesizer(&self) -> &ImageSynthesizer<I> {
        &self.synthesizer
    }

    /// Receive a progress update after every processed scene.
    ///
    /// Updates sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdate> {
        self.progress.subscribe()
    }

    /// Run the pipeline for one story.
    ///
    /// # Errors
    ///
    /// Only a decomposition-stage failure is returned. The run is still
    /// recorded in the gallery with status `aborted`. Scene failures never
    /// escape; they are recorded on the scene.
    pub async fn run(&self, story: StoryInput) -> StoryboardResult<Run> {
        self.run_with_cancellation(story, CancellationToken::new())
            .await
    }

    /// Run the pipeline, stopping between scenes once `cancel` fires.
    ///
    /// The scene being rendered when cancellation arrives completes
    /// normally; every later scene is marked cancelled and the run ends
    /// `completed_with_errors`.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    #[instrument(skip(self, story, cancel), fields(run_id = tracing::field::Empty))]
    pub async fn run_with_cancellation(
        &self,
        story: StoryInput,
        cancel: CancellationToken,
    ) -> StoryboardResult<Run> {
        let _worker = self.worker.lock().await;

        let mut run = Run::new(story);
        tracing::Span::current().record("run_id", tracing::field::display(run.id()));
        run.begin_decomposition();

        let prompts = match self.decomposer.decompose(run.story()).await {
            Ok(prompts) => prompts,
            Err(e) => return Err(self.abort(run, e).await),
        };

        if let Err(e) = run.begin_rendering(prompts) {
            return Err(self.abort(run, e).await);
        }
        self.gallery.record(run.clone()).await;
        info!(scenes = run.scenes().len(), "Rendering scenes");

        let total = run.scenes().len();
        for index in 0..total {
            if cancel.is_cancelled() {
                info!(next_index = index, "Run cancelled, skipping remaining scenes");
                run.cancel_remaining();
                break;
            }

            let Some(pending) = run.scene(index).cloned() else {
                break;
            };
            let result = self.render(pending).await;
            let last_status = result.status();
            run.resolve_scene(result)?;

            self.gallery.record(run.clone()).await;
            self.publish(ProgressUpdate {
                run_id: *run.id(),
                index,
                scenes_done: run.scenes_done(),
                scenes_total: total,
                last_status,
            });
        }

        run.finish();
        self.gallery.record(run.clone()).await;
        info!(
            status = %run.status(),
            succeeded = run.count_with_status(storyboard_core::SceneStatus::Succeeded),
            "Run finished"
        );
        Ok(run)
    }

    /// Render one scene of a finished run again and replace its result.
    ///
    /// Any scene may be retried, including one that succeeded. The run's
    /// completion status is recomputed from the new result.
    ///
    /// # Errors
    ///
    /// - `RunNotFound` for an unknown run
    /// - `RunInProgress` while the run has not finished
    /// - `SceneNotFound` for an index the run does not hold, which includes
    ///   every index of an aborted run
    #[instrument(skip(self), fields(run_id = %run_id))]
    pub async fn retry_scene(&self, run_id: &RunId, index: usize) -> StoryboardResult<SceneResult> {
        let run = self
            .gallery
            .get(run_id)
            .await
            .ok_or_else(|| GalleryError::new(GalleryErrorKind::RunNotFound(run_id.to_string())))?;
        if !run.status().is_terminal() {
            return Err(GalleryError::new(GalleryErrorKind::RunInProgress(run_id.to_string())).into());
        }

        let _worker = self.worker.lock().await;

        let previous = self.gallery.scene(run_id, index).await?;
        let result = self.render(previous.reattempt()).await;
        let updated = self.gallery.replace_scene(run_id, result.clone()).await?;

        info!(
            index,
            status = %result.status(),
            attempts = *result.attempt_count(),
            run_status = %updated.status(),
            "Scene retried"
        );
        self.publish(ProgressUpdate {
            run_id: *run_id,
            index,
            scenes_done: updated.scenes_done(),
            scenes_total: updated.scenes().len(),
            last_status: result.status(),
        });

        Ok(result)
    }

    async fn render(&self, pending: SceneResult) -> SceneResult {
        let index = pending.index();
        match self.synthesizer.synthesize(pending.prompt()).await {
            Ok(image) => pending.into_succeeded(image),
            Err(e) => {
                warn!(index, error = %e, "Scene synthesis failed");
                pending.into_failed(e.user_message())
            }
        }
    }

    async fn abort(&self, mut run: Run, error: StoryboardError) -> StoryboardError {
        warn!(error = %error, "Decomposition failed, aborting run");
        run.abort(error.user_message());
        self.gallery.record(run).await;
        error
    }

    fn publish(&self, update: ProgressUpdate) {
        if self.progress.send(update).is_err() {
            debug!("No progress subscribers");
        }
    }
}

