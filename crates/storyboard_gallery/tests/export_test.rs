use storyboard_core::{
    RenderedImage, Run, SCENE_COUNT, ScenePrompt, SceneStatus, StoryInput,
};
use storyboard_gallery::{ExportManifest, FileSystemExporter};

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn run_with_failure_at(failed: usize) -> Run {
    let mut run = Run::new(StoryInput::new("A fox and a crow meet in a forest.").unwrap());
    run.begin_decomposition();
    let prompts = (0..SCENE_COUNT)
        .map(|i| {
            ScenePrompt::new(
                i,
                format!("Scene {}", i + 1),
                vec!["fox".to_string(), "crow".to_string()],
                "cartoon",
                Some("warm".to_string()),
            )
        })
        .collect();
    run.begin_rendering(prompts).unwrap();

    for index in 0..SCENE_COUNT {
        let pending = run.scene(index).unwrap().clone();
        let resolved = if index == failed {
            pending.into_failed("Content rejected by backend: unsafe")
        } else {
            let mut bytes = PNG_HEADER.to_vec();
            bytes.push(index as u8);
            pending.into_succeeded(RenderedImage::new(bytes, Some("image/png".to_string())))
        };
        run.resolve_scene(resolved).unwrap();
    }
    run.finish();
    run
}

#[tokio::test]
async fn export_writes_images_and_manifest() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let exporter = FileSystemExporter::new(temp.path().join("out"))?;
    let run = run_with_failure_at(9);

    let manifest = exporter.export(&run).await?;
    let dir = exporter.run_dir(run.id());

    for n in 1..=9 {
        let path = dir.join(format!("scene_{:02}.png", n));
        let bytes = tokio::fs::read(&path).await?;
        assert_eq!(bytes[..8], PNG_HEADER);
    }
    assert!(!dir.join("scene_10.png").exists());

    let failed = &manifest.scenes()[9];
    assert_eq!(*failed.status(), SceneStatus::Failed);
    assert!(failed.file().is_none());
    assert!(failed.error_detail().as_deref().unwrap().contains("rejected"));

    let first = &manifest.scenes()[0];
    assert_eq!(first.file().as_deref(), Some("scene_01.png"));
    assert_eq!(first.sha256().as_ref().map(|h| h.len()), Some(64));
    assert_eq!(first.mood().as_deref(), Some("warm"));

    let json = tokio::fs::read_to_string(dir.join("manifest.json")).await?;
    let parsed: ExportManifest = serde_json::from_str(&json)?;
    assert_eq!(parsed, manifest);
    assert!(json.contains("\"completed_with_errors\""));

    Ok(())
}

#[tokio::test]
async fn export_of_aborted_run_has_only_manifest() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let exporter = FileSystemExporter::new(temp.path())?;

    let mut run = Run::new(StoryInput::new("story")?);
    run.begin_decomposition();
    run.abort("expected 10 scenes, found 9");

    let manifest = exporter.export(&run).await?;
    assert!(manifest.scenes().is_empty());
    assert_eq!(manifest.error_detail().as_deref(), Some("expected 10 scenes, found 9"));

    let mut entries = tokio::fs::read_dir(exporter.run_dir(run.id())).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    assert_eq!(names, vec!["manifest.json".to_string()]);

    Ok(())
}
