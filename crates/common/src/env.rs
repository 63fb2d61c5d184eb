//! Environment/runtime helpers
//!
//! Sanity checks to ensure the media directories exist at startup.

use tracing::{info, warn};

/// Create the public image directory and the upload staging directory.
///
/// Missing `public_dir` is only warned about since it is created along with
/// `images_dir` when the latter lives below it.
pub async fn ensure_env(public_dir: &str, images_dir: &str, temp_dir: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(public_dir).await.is_err() {
        warn!(%public_dir, "public directory not found; creating it");
    }
    for dir in [images_dir, temp_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
    }
    info!(%images_dir, %temp_dir, "media directories ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_env_creates_media_dirs() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("catalog_env_{}", uuid::Uuid::new_v4()));
        let public = root.join("public");
        let images = public.join("images");
        let temp = public.join("temp");

        ensure_env(
            &public.to_string_lossy(),
            &images.to_string_lossy(),
            &temp.to_string_lossy(),
        )
        .await?;

        assert!(tokio::fs::metadata(&images).await?.is_dir());
        assert!(tokio::fs::metadata(&temp).await?.is_dir());

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
