//! Text encoding of scene images for download and embedding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storyboard_core::SceneResult;
use storyboard_error::{GalleryError, GalleryErrorKind, StoryboardResult};

/// Image container formats recognised by magic bytes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Portable Network Graphics
    #[display("png")]
    Png,
    /// JPEG
    #[display("jpeg")]
    Jpeg,
    /// WebP
    #[display("webp")]
    Webp,
    /// GIF
    #[display("gif")]
    Gif,
}

impl ImageFormat {
    /// Detect the format from leading bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_gallery::ImageFormat;
    ///
    /// let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    /// assert_eq!(ImageFormat::sniff(&png), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::sniff(b"plain text"), None);
    /// ```
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// Format for a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::Webp),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// MIME type.
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Gif => "gif",
        }
    }

    /// Format of a scene image: backend-reported MIME first, then magic bytes.
    pub fn detect(mime: Option<&str>, data: &[u8]) -> Option<Self> {
        mime.and_then(Self::from_mime).or_else(|| Self::sniff(data))
    }
}

/// A scene image packaged for transfer to a browser or file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct DownloadArtifact {
    /// Suggested filename, `scene_{n}.{ext}` with 1-based `n`
    filename: String,
    /// MIME type of the image
    mime: String,
    /// Standard base64 of the image bytes
    encoded: String,
}

impl DownloadArtifact {
    /// `data:` URL suitable for an `<img src>` or download link.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.encoded)
    }
}

#[track_caller]
fn scene_image(scene: &SceneResult) -> StoryboardResult<&storyboard_core::RenderedImage> {
    scene
        .image()
        .ok_or_else(|| GalleryError::new(GalleryErrorKind::NoImage(scene.index())).into())
}

/// Encode a succeeded scene's image as standard base64.
///
/// # Errors
///
/// Returns `NoImage` if the scene has not succeeded.
///
/// # Examples
///
/// ```
/// use storyboard_core::{RenderedImage, ScenePrompt, SceneResult};
/// use storyboard_gallery::{decode_download, encode_for_download};
///
/// let scene = SceneResult::pending(ScenePrompt::new(0, "A fox", vec![], "ink", None))
///     .into_succeeded(RenderedImage::new(vec![0, 159, 146, 150], None));
///
/// let encoded = encode_for_download(&scene).unwrap();
/// assert_eq!(decode_download(&encoded).unwrap(), vec![0, 159, 146, 150]);
/// ```
#[track_caller]
pub fn encode_for_download(scene: &SceneResult) -> StoryboardResult<String> {
    let image = scene_image(scene)?;
    Ok(STANDARD.encode(&image.data))
}

/// Decode a string produced by [`encode_for_download`].
///
/// A `data:` URL prefix is accepted and stripped.
///
/// # Errors
///
/// Returns `Decode` if the text is not valid base64.
#[track_caller]
pub fn decode_download(encoded: &str) -> StoryboardResult<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => encoded,
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|e| GalleryError::new(GalleryErrorKind::Decode(e.to_string())).into())
}

/// Package a succeeded scene's image with filename and MIME type.
///
/// Images whose format cannot be determined are labelled
/// `application/octet-stream` with a `.bin` extension.
///
/// # Errors
///
/// Returns `NoImage` if the scene has not succeeded.
#[track_caller]
pub fn download_artifact(scene: &SceneResult) -> StoryboardResult<DownloadArtifact> {
    let image = scene_image(scene)?;
    let format = ImageFormat::detect(image.mime.as_deref(), &image.data);

    let (mime, extension) = match format {
        Some(format) => (format.mime().to_string(), format.extension()),
        None => ("application/octet-stream".to_string(), "bin"),
    };

    Ok(DownloadArtifact {
        filename: format!("scene_{}.{}", scene.index() + 1, extension),
        mime,
        encoded: STANDARD.encode(&image.data),
    })
}
