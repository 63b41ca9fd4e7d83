use storyboard_core::{RenderedImage, ScenePrompt, SceneResult};
use storyboard_gallery::{
    GalleryStore, ImageFormat, decode_download, download_artifact, encode_for_download,
};

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn scene(index: usize) -> SceneResult {
    SceneResult::pending(ScenePrompt::new(index, "A crow", vec![], "ink", None))
}

#[test]
fn encoding_round_trips_arbitrary_bytes() {
    let samples: Vec<Vec<u8>> = vec![
        vec![0],
        vec![255; 3],
        (0..=255).collect(),
        PNG_HEADER.to_vec(),
        b"not really an image".to_vec(),
    ];

    for bytes in samples {
        let done = scene(0).into_succeeded(RenderedImage::new(bytes.clone(), None));
        let encoded = encode_for_download(&done).unwrap();
        assert_eq!(decode_download(&encoded).unwrap(), bytes);
        assert_eq!(GalleryStore::encode_for_download(&done).unwrap(), encoded);
    }
}

#[test]
fn encoding_requires_an_image() {
    assert!(encode_for_download(&scene(2)).is_err());
    assert!(encode_for_download(&scene(2).into_failed("rejected")).is_err());
    assert!(download_artifact(&scene(2).into_cancelled()).is_err());
}

#[test]
fn artifact_uses_sniffed_format() {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.extend_from_slice(&[1, 2, 3]);
    let done = scene(4).into_succeeded(RenderedImage::new(bytes.clone(), None));

    let artifact = download_artifact(&done).unwrap();
    assert_eq!(artifact.filename(), "scene_5.png");
    assert_eq!(artifact.mime(), "image/png");
    assert!(artifact.data_url().starts_with("data:image/png;base64,"));
    assert_eq!(decode_download(&artifact.data_url()).unwrap(), bytes);
}

#[test]
fn artifact_prefers_backend_mime() {
    let done = scene(0).into_succeeded(RenderedImage::new(
        vec![0xFF, 0xD8, 0xFF, 0xE0],
        Some("image/webp".to_string()),
    ));
    let artifact = download_artifact(&done).unwrap();
    assert_eq!(artifact.filename(), "scene_1.webp");
    assert_eq!(artifact.mime(), "image/webp");
}

#[test]
fn unknown_format_falls_back_to_binary() {
    let done = scene(9).into_succeeded(RenderedImage::new(vec![1, 2, 3], None));
    let artifact = download_artifact(&done).unwrap();
    assert_eq!(artifact.filename(), "scene_10.bin");
    assert_eq!(artifact.mime(), "application/octet-stream");
}

#[test]
fn sniffs_common_formats() {
    assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xDB]), Some(ImageFormat::Jpeg));
    assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
    assert_eq!(
        ImageFormat::sniff(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
        Some(ImageFormat::Webp)
    );
    assert_eq!(ImageFormat::sniff(b"RIFF"), None);
}

#[test]
fn invalid_download_text_is_rejected() {
    assert!(decode_download("%%% not base64 %%%").is_err());
}
