//! Story run command handler.

use std::path::PathBuf;
use storyboard::{
    FileSystemExporter, GalleryStore, GeminiClient, HuggingFaceImageClient, ImageSynthesizer,
    PipelineOrchestrator, ProgressUpdate, RunSummary, SceneDecomposer, StorageError,
    StorageErrorKind, StoryboardConfig, StoryboardResult, read_story,
};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Options for `storyboard run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Story file, or `-` for stdin
    pub story: PathBuf,
    /// Export directory
    pub out: Option<PathBuf>,
    /// Text model override
    pub text_model: Option<String>,
    /// Image model override
    pub image_model: Option<String>,
    /// Print JSON instead of text
    pub json: bool,
}

/// Run the pipeline for one story and print the result.
///
/// Ctrl-C cancels between scenes; the partial run is still reported and
/// exported.
///
/// # Errors
///
/// Returns the decomposition error when the run aborts, after printing the
/// aborted run. Credential, configuration and export failures are returned
/// as well.
pub async fn run_story(mut config: StoryboardConfig, options: RunOptions) -> StoryboardResult<()> {
    if let Some(model) = &options.text_model {
        config.pipeline = config.pipeline.clone().with_text_model(model.clone());
    }
    if let Some(model) = &options.image_model {
        config.image = config.image.clone().with_model(model.clone());
    }

    let story = read_story(&options.story, std::io::stdin())?;
    info!(
        chars = story.char_count(),
        text_model = %config.pipeline.text_model(),
        image_model = %config.image.model(),
        "Starting run"
    );

    let text = GeminiClient::from_config(&config)?;
    let image = HuggingFaceImageClient::from_config(&config)?;
    let gallery = match config.gallery.max_runs() {
        Some(limit) => GalleryStore::with_max_runs(*limit),
        None => GalleryStore::new(),
    };

    let orchestrator = PipelineOrchestrator::new(
        SceneDecomposer::new(text, config.pipeline.clone()),
        ImageSynthesizer::new(image, config.image.clone())
            .with_timeout(config.pipeline.backend_timeout()),
        gallery.clone(),
    );

    let reporter = tokio::spawn(report_progress(orchestrator.subscribe()));

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted, finishing the current scene...");
                cancel.cancel();
            }
        }
    });

    let result = orchestrator.run_with_cancellation(story, cancel).await;
    interrupt.abort();
    drop(orchestrator);
    if let Err(e) = reporter.await {
        warn!(error = %e, "Progress reporter stopped unexpectedly");
    }

    let run = match result {
        Ok(run) => run,
        Err(e) => {
            if let Some(aborted) = gallery.latest().await {
                print_summary(&RunSummary::from_run(&aborted), options.json)?;
            }
            return Err(e);
        }
    };

    let mut summary = RunSummary::from_run(&run);
    let out = options.out.or_else(|| config.gallery.export_dir().clone());
    if let Some(out) = out {
        let exporter = FileSystemExporter::new(&out)?;
        let manifest = exporter.export(&run).await?;
        summary = summary.with_export(exporter.run_dir(run.id()), &manifest);
    }

    print_summary(&summary, options.json)
}

async fn report_progress(mut updates: Receiver<ProgressUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => eprintln!(
                "[{}/{}] scene {} {}",
                update.scenes_done,
                update.scenes_total,
                update.index + 1,
                update.last_status
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Progress reporter fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> StoryboardResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(summary).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("run summary: {}", e)))
        })?;
        println!("{}", rendered);
    } else {
        println!("{}", summary);
    }
    Ok(())
}
