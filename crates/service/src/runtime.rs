//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server only needs the media
//! section of its config to prepare the filesystem.

use configs::MediaConfig;

/// Ensure the image and staging directories exist.
pub async fn ensure_env(media: &MediaConfig) -> anyhow::Result<()> {
    common::env::ensure_env(&media.public_dir, &media.images_dir, &media.temp_dir).await
}
