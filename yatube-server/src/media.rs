//! Uploaded image storage
//!
//! Images are checked by content, not by extension, and written under
//! `<media_root>/posts/` with a unique prefix. The stored path, relative to
//! the media root, is what posts keep in their `image` column.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use image::ImageFormat;
use tokio::task::JoinError;
use uuid::Uuid;

/// Subdirectory for post images
pub const POSTS_DIR: &str = "posts";

const MAX_NAME_LEN: usize = 100;

/// Image formats accepted for posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Gif,
    Png,
    Jpeg,
    Webp,
}

impl ImageKind {
    pub fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// Identify and fully decode an upload.
    ///
    /// Unsupported formats and files that fail to decode (truncated or
    /// corrupted data) are [`MediaError::NotAnImage`].
    pub async fn detect(bytes: Bytes) -> Result<Self, MediaError> {
        tokio::task::spawn_blocking(move || Self::decode(&bytes)).await?
    }

    fn decode(bytes: &[u8]) -> Result<Self, MediaError> {
        let format = image::guess_format(bytes).map_err(|_| MediaError::NotAnImage)?;
        let kind = Self::from_format(format).ok_or(MediaError::NotAnImage)?;
        image::load_from_memory_with_format(bytes, format).map_err(|e| {
            tracing::debug!(error = %e, "image failed to decode");
            MediaError::NotAnImage
        })?;
        Ok(kind)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("upload is not a supported image")]
    NotAnImage,

    #[error("media storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decoding task failed: {0}")]
    Join(#[from] JoinError),
}

/// Directory-backed store for uploaded files
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a post image, returning its media-relative path.
    pub async fn save_post_image(
        &self,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<String, MediaError> {
        let kind = ImageKind::detect(bytes.clone()).await?;

        let dir = self.root.join(POSTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!(
            "{}_{}",
            Uuid::new_v4().simple(),
            sanitize_file_name(file_name, kind)
        );
        tokio::fs::write(dir.join(&name), &bytes).await?;

        tracing::debug!(file = %name, bytes = bytes.len(), "stored post image");
        Ok(format!("{POSTS_DIR}/{name}"))
    }
}

/// Keep the client's base name readable but filesystem safe.
fn sanitize_file_name(raw: &str, kind: ImageKind) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        format!("image.{}", kind.extension())
    } else {
        cleaned.to_owned()
    }
}
