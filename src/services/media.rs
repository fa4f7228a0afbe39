//! Media storage for uploaded cover images

use std::path::{Path, PathBuf};

use image::ImageFormat;
use uuid::Uuid;

use crate::{
    config::MediaConfig,
    error::{AppError, AppResult},
    models::cover::ImageTarget,
};

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Check that `bytes` decode as an image and return the detected format.
pub fn validate_image(bytes: &[u8]) -> AppResult<ImageFormat> {
    if bytes.is_empty() {
        return Err(AppError::field("cover", "The submitted file is empty."));
    }
    let format = image::guess_format(bytes).map_err(|_| AppError::field("cover", INVALID_IMAGE))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|_| AppError::field("cover", INVALID_IMAGE))?;
    Ok(format)
}

#[derive(Clone)]
pub struct MediaService {
    config: MediaConfig,
}

impl MediaService {
    pub fn new(config: MediaConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        Path::new(&self.config.root)
    }

    /// Validate and write an uploaded image; returns the path relative to the media root.
    pub async fn store_image(&self, target: ImageTarget, bytes: Vec<u8>) -> AppResult<String> {
        // Decoding is CPU-bound
        let (format, bytes) = tokio::task::spawn_blocking(move || {
            validate_image(&bytes).map(|format| (format, bytes))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Image validation task failed: {}", e)))??;

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let relative = format!(
            "uploads/{}/{}.{}",
            target.directory(),
            Uuid::new_v4(),
            extension
        );

        let path: PathBuf = self.root().join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!("Stored cover for {} at {}", target, relative);

        Ok(relative)
    }

    /// Public URL under which a stored file is served
    pub fn public_url(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.config.url_prefix.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }
}
