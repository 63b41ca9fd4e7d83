use storyboard_core::{
    RenderedImage, Run, RunId, RunStatus, SCENE_COUNT, ScenePrompt, SceneStatus, StoryInput,
};
use storyboard_error::{GalleryErrorKind, StoryboardErrorKind};
use storyboard_gallery::GalleryStore;

fn finished_run(failed: &[usize]) -> Run {
    let mut run = Run::new(StoryInput::new("A fox and a crow meet in a forest.").unwrap());
    run.begin_decomposition();
    let prompts = (0..SCENE_COUNT)
        .map(|i| ScenePrompt::new(i, format!("Scene {}", i + 1), vec![], "cartoon", None))
        .collect();
    run.begin_rendering(prompts).unwrap();

    for index in 0..SCENE_COUNT {
        let pending = run.scene(index).unwrap().clone();
        let resolved = if failed.contains(&index) {
            pending.into_failed("content rejected")
        } else {
            pending.into_succeeded(RenderedImage::new(vec![index as u8; 4], None))
        };
        run.resolve_scene(resolved).unwrap();
    }
    run.finish();
    run
}

fn gallery_kind(err: &storyboard_error::StoryboardError) -> Option<&GalleryErrorKind> {
    match err.kind() {
        StoryboardErrorKind::Gallery(e) => Some(&e.kind),
        _ => None,
    }
}

#[tokio::test]
async fn starts_empty() {
    let gallery = GalleryStore::new();
    assert!(gallery.is_empty().await);
    assert!(gallery.latest().await.is_none());
    assert!(gallery.all().await.is_empty());
}

#[tokio::test]
async fn record_keeps_order_and_upserts() {
    let gallery = GalleryStore::new();
    let first = finished_run(&[]);
    let second = finished_run(&[3]);
    let first_id = *first.id();
    let second_id = *second.id();

    gallery.record(first.clone()).await;
    gallery.record(second).await;
    assert_eq!(gallery.len().await, 2);

    // Re-recording the first run updates it in place.
    gallery.record(first).await;
    let ids: Vec<RunId> = gallery.all().await.iter().map(|r| *r.id()).collect();
    assert_eq!(ids, vec![first_id, second_id]);
    assert_eq!(gallery.latest().await.map(|r| *r.id()), Some(second_id));
}

#[tokio::test]
async fn snapshots_do_not_track_later_writes() {
    let gallery = GalleryStore::new();
    let mut run = Run::new(StoryInput::new("story").unwrap());
    gallery.record(run.clone()).await;

    let snapshot = gallery.get(run.id()).await.unwrap();
    run.begin_decomposition();
    gallery.record(run.clone()).await;

    assert_eq!(*snapshot.status(), RunStatus::Created);
    assert_eq!(
        *gallery.get(run.id()).await.unwrap().status(),
        RunStatus::Decomposing
    );
}

#[tokio::test]
async fn retention_evicts_oldest() {
    let gallery = GalleryStore::with_max_runs(2);
    let runs: Vec<Run> = (0..3).map(|_| finished_run(&[])).collect();

    for run in &runs {
        gallery.record(run.clone()).await;
    }

    let ids: Vec<RunId> = gallery.all().await.iter().map(|r| *r.id()).collect();
    assert_eq!(ids, vec![*runs[1].id(), *runs[2].id()]);
}

#[tokio::test]
async fn scene_lookup_errors() {
    let gallery = GalleryStore::new();
    let run = finished_run(&[]);
    let id = *run.id();
    gallery.record(run).await;

    assert_eq!(*gallery.scene(&id, 9).await.unwrap().prompt().index(), 9);

    let err = gallery.scene(&id, 10).await.unwrap_err();
    assert!(matches!(
        gallery_kind(&err),
        Some(GalleryErrorKind::SceneNotFound { index: 10, .. })
    ));

    let err = gallery.scene(&RunId::new(), 0).await.unwrap_err();
    assert!(matches!(gallery_kind(&err), Some(GalleryErrorKind::RunNotFound(_))));
}

#[tokio::test]
async fn replace_scene_swaps_result_and_status() {
    let gallery = GalleryStore::new();
    let run = finished_run(&[4]);
    let id = *run.id();
    let original = run.scene(4).unwrap().clone();
    gallery.record(run).await;

    let retry = original
        .reattempt()
        .into_succeeded(RenderedImage::new(vec![9, 9], None));
    let updated = gallery.replace_scene(&id, retry).await.unwrap();

    assert_eq!(*updated.status(), RunStatus::Completed);
    assert_eq!(updated.scene(4).unwrap().status(), SceneStatus::Succeeded);
    assert_eq!(*updated.scene(4).unwrap().attempt_count(), 2);
    // The previous result value is untouched.
    assert_eq!(original.status(), SceneStatus::Failed);
    assert_eq!(gallery.get(&id).await.unwrap(), updated);
}

#[tokio::test]
async fn replace_scene_rejects_unfinished_runs() {
    let gallery = GalleryStore::new();
    let mut run = Run::new(StoryInput::new("story").unwrap());
    run.begin_decomposition();
    let prompts = (0..SCENE_COUNT)
        .map(|i| ScenePrompt::new(i, "Scene", vec![], "cartoon", None))
        .collect();
    run.begin_rendering(prompts).unwrap();
    let id = *run.id();
    let candidate = run.scene(0).unwrap().reattempt().into_failed("boom");
    gallery.record(run).await;

    let err = gallery.replace_scene(&id, candidate).await.unwrap_err();
    assert!(matches!(gallery_kind(&err), Some(GalleryErrorKind::RunInProgress(_))));
}

#[tokio::test]
async fn reset_clears_everything() {
    let gallery = GalleryStore::new();
    gallery.record(finished_run(&[])).await;
    gallery.record(finished_run(&[1])).await;

    let reader = gallery.clone();
    gallery.reset().await;

    assert!(reader.is_empty().await);
}
