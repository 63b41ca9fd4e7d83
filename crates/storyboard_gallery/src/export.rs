//! Writes runs to disk as image files plus a JSON manifest.
//!
//! Layout:
//!
//! ```text
//! {base_path}/
//! └── {run_id}/
//!     ├── manifest.json
//!     ├── scene_01.png
//!     ├── scene_02.png
//!     └── ...
//! ```

use crate::ImageFormat;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use storyboard_core::{Run, RunId, RunStatus, SceneResult, SceneStatus};
use storyboard_error::{StorageError, StorageErrorKind, StoryboardResult};

/// Per-scene manifest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ManifestEntry {
    /// Scene index (0-based)
    index: usize,
    /// Scene status
    status: SceneStatus,
    /// Scene summary
    description: String,
    /// Salient objects and characters
    visual_elements: Vec<String>,
    /// Art direction
    style: String,
    /// Emotional tone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mood: Option<String>,
    /// Prompt sent to the image backend
    raw_prompt: String,
    /// Synthesis attempts made
    attempt_count: u32,
    /// Image filename relative to the run directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    /// SHA-256 of the image bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
}

/// Manifest describing one exported run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ExportManifest {
    /// Run identifier
    run_id: RunId,
    /// Run status at export time
    status: RunStatus,
    /// When the run was accepted
    created_at: DateTime<Utc>,
    /// When the run finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    /// Whether rendering stopped early
    cancelled: bool,
    /// Run-level failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    /// One entry per scene, in index order
    scenes: Vec<ManifestEntry>,
}

/// Exports runs into a directory tree.
#[derive(Debug, Clone)]
pub struct FileSystemExporter {
    base_path: PathBuf,
}

impl FileSystemExporter {
    /// Create an exporter rooted at `base_path`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StoryboardResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created export directory");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory a run is exported into.
    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.base_path.join(run_id.to_string())
    }

    /// Compute SHA-256 hash of data.
    fn compute_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }

    fn scene_filename(scene: &SceneResult, data: &[u8], mime: Option<&str>) -> String {
        let extension = ImageFormat::detect(mime, data)
            .map(|f| f.extension())
            .unwrap_or("bin");
        format!("scene_{:02}.{}", scene.index() + 1, extension)
    }

    /// Write every succeeded scene image and the manifest.
    ///
    /// Exporting the same run twice overwrites the earlier files.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be written.
    #[tracing::instrument(skip(self, run), fields(run_id = %run.id(), scenes = run.scenes().len()))]
    pub async fn export(&self, run: &Run) -> StoryboardResult<ExportManifest> {
        let dir = self.run_dir(run.id());
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let mut entries = Vec::with_capacity(run.scenes().len());
        for scene in run.scenes() {
            let prompt = scene.prompt();
            let (file, sha256) = match scene.image() {
                Some(image) => {
                    let filename = Self::scene_filename(scene, &image.data, image.mime.as_deref());
                    Self::write_atomic(&dir.join(&filename), &image.data).await?;
                    (Some(filename), Some(Self::compute_hash(&image.data)))
                }
                None => (None, None),
            };

            entries.push(ManifestEntry {
                index: scene.index(),
                status: scene.status(),
                description: prompt.description().clone(),
                visual_elements: prompt.visual_elements().clone(),
                style: prompt.style().clone(),
                mood: prompt.mood().clone(),
                raw_prompt: prompt.raw_prompt().clone(),
                attempt_count: *scene.attempt_count(),
                file,
                sha256,
                error_detail: scene.error_detail().map(str::to_string),
            });
        }

        let manifest = ExportManifest {
            run_id: *run.id(),
            status: *run.status(),
            created_at: *run.created_at(),
            finished_at: *run.finished_at(),
            cancelled: *run.cancelled(),
            error_detail: run.error_detail().clone(),
            scenes: entries,
        };

        let json = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "manifest for run {}: {}",
                run.id(),
                e
            )))
        })?;
        Self::write_atomic(&dir.join("manifest.json"), &json).await?;

        tracing::info!(
            path = %dir.display(),
            images = manifest.scenes.iter().filter(|e| e.file.is_some()).count(),
            "Exported run"
        );

        Ok(manifest)
    }

    /// Write to a temp file first, then rename.
    async fn write_atomic(path: &Path, data: &[u8]) -> StoryboardResult<()> {
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        Ok(())
    }
}
