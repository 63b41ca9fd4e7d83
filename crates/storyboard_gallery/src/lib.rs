//! Gallery state, download encoding and on-disk export for Storyboard.
//!
//! [`GalleryStore`] is the process-wide container the orchestrator writes runs
//! into and the presentation layer reads from. Reads return cloned snapshots,
//! so a run that is still rendering is never observed half-updated.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod download;
mod export;
mod store;

pub use download::{DownloadArtifact, ImageFormat, decode_download, download_artifact, encode_for_download};
pub use export::{ExportManifest, FileSystemExporter, ManifestEntry};
pub use store::GalleryStore;
