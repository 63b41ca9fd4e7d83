//! Printable run reports for the command line.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use storyboard_core::{Run, RunId, RunStatus, SceneResult, SceneStatus};
use storyboard_gallery::ExportManifest;

/// One scene line of a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct SceneSummary {
    /// 1-based scene number
    number: usize,
    /// Scene status
    status: SceneStatus,
    /// Scene description
    description: String,
    /// Art direction
    style: String,
    /// Emotional tone
    #[serde(skip_serializing_if = "Option::is_none")]
    mood: Option<String>,
    /// Synthesis attempts
    attempt_count: u32,
    /// Encoded image size
    #[serde(skip_serializing_if = "Option::is_none")]
    image_bytes: Option<usize>,
    /// Exported file, relative to the run directory
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
}

impl SceneSummary {
    fn from_scene(scene: &SceneResult) -> Self {
        let prompt = scene.prompt();
        Self {
            number: scene.index() + 1,
            status: scene.status(),
            description: prompt.description().clone(),
            style: prompt.style().clone(),
            mood: prompt.mood().clone(),
            attempt_count: *scene.attempt_count(),
            image_bytes: scene.image_bytes().map(<[u8]>::len),
            file: None,
            error_detail: scene.error_detail().map(str::to_string),
        }
    }
}

/// Outcome of a run, for humans (`Display`) or scripts (`Serialize`).
///
/// # Examples
///
/// ```
/// use storyboard::{Run, RunSummary, StoryInput};
///
/// let mut run = Run::new(StoryInput::new("A short tale.").unwrap());
/// run.begin_decomposition();
/// run.abort("Backend unavailable: connection refused");
///
/// let summary = RunSummary::from_run(&run);
/// assert!(summary.to_string().contains("aborted"));
/// assert!(summary.scenes().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_getters::Getters)]
pub struct RunSummary {
    /// Run identifier
    run_id: RunId,
    /// Final status
    status: RunStatus,
    /// Whether rendering stopped early
    cancelled: bool,
    /// Scenes that rendered
    succeeded: usize,
    /// Scenes that failed
    failed: usize,
    /// Run-level failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    /// Directory the run was exported to
    #[serde(skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,
    /// Per-scene lines in index order
    scenes: Vec<SceneSummary>,
}

impl RunSummary {
    /// Summarize a run snapshot.
    pub fn from_run(run: &Run) -> Self {
        Self {
            run_id: *run.id(),
            status: *run.status(),
            cancelled: *run.cancelled(),
            succeeded: run.count_with_status(SceneStatus::Succeeded),
            failed: run.count_with_status(SceneStatus::Failed),
            error_detail: run.error_detail().clone(),
            export_dir: None,
            scenes: run.scenes().iter().map(SceneSummary::from_scene).collect(),
        }
    }

    /// Attach the export location and per-scene filenames.
    pub fn with_export(mut self, dir: impl Into<PathBuf>, manifest: &ExportManifest) -> Self {
        self.export_dir = Some(dir.into());
        for entry in manifest.scenes() {
            if let Some(scene) = self.scenes.get_mut(*entry.index()) {
                scene.file = entry.file().clone();
            }
        }
        self
    }

    /// Whether the run produced scenes at all.
    pub fn is_aborted(&self) -> bool {
        self.status == RunStatus::Aborted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Run {}: {}", self.run_id, self.status)?;
        if self.is_aborted() {
            if let Some(detail) = &self.error_detail {
                write!(f, "\n  {}", detail)?;
            }
            return Ok(());
        }

        write!(
            f,
            " ({} of {} scenes rendered{})",
            self.succeeded,
            self.scenes.len(),
            if self.cancelled { ", cancelled" } else { "" }
        )?;

        for scene in &self.scenes {
            write!(
                f,
                "\n  Scene {:>2} [{}] {}",
                scene.number, scene.status, scene.description
            )?;
            if let Some(file) = &scene.file {
                write!(f, " -> {}", file)?;
            }
            if let Some(detail) = &scene.error_detail {
                write!(f, "\n           error: {}", detail)?;
            }
        }

        if let Some(dir) = &self.export_dir {
            write!(f, "\nExported to {}", dir.display())?;
        }
        Ok(())
    }
}
