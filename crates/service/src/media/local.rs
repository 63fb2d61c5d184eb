use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use configs::MediaConfig;

use super::{MediaError, MediaStore, ProductImage};

/// Keeps images on local disk below a directory served at `/images`.
#[derive(Clone, Debug)]
pub struct LocalMediaStore {
    images_dir: PathBuf,
    public_base_url: String,
}

impl LocalMediaStore {
    pub fn new(images_dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            images_dir: images_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(cfg: &MediaConfig) -> Self { Self::new(&cfg.images_dir, &cfg.public_base_url) }

    fn url_for(&self, file_name: &str) -> String {
        format!("{}/images/{}", self.public_base_url, file_name)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, local_path: &Path) -> Result<Option<ProductImage>, MediaError> {
        let meta = fs::metadata(local_path).await?;
        if !meta.is_file() || meta.len() == 0 {
            warn!(path = %local_path.display(), "refusing to store empty upload");
            return Ok(None);
        }
        let Some(file_name) = local_path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };

        fs::create_dir_all(&self.images_dir).await?;
        let dest = self.images_dir.join(file_name);
        // rename fails across filesystems; fall back to copy + delete
        if fs::rename(local_path, &dest).await.is_err() {
            fs::copy(local_path, &dest).await?;
            fs::remove_file(local_path).await?;
        }

        let image = ProductImage {
            url: self.url_for(file_name),
            local_path: dest.to_string_lossy().into_owned(),
        };
        info!(url = %image.url, local_path = %image.local_path, bytes = meta.len(), "stored image");
        Ok(Some(image))
    }

    async fn remove(&self, local_path: &str) -> Result<(), MediaError> {
        let path = Path::new(local_path);
        if !path.starts_with(&self.images_dir) {
            return Err(MediaError::Rejected(local_path.to_string()));
        }
        fs::remove_file(path).await?;
        info!(%local_path, "removed image");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("catalog_media_{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn upload_moves_file_and_builds_url() -> Result<(), anyhow::Error> {
        let root = scratch_dir();
        let staged = root.join("temp").join("abc-shoe.png");
        fs::create_dir_all(staged.parent().unwrap()).await?;
        fs::write(&staged, b"png-bytes").await?;

        let store = LocalMediaStore::new(root.join("images"), "http://localhost:8080/");
        let image = store.upload(&staged).await?.expect("stored");

        assert_eq!(image.url, "http://localhost:8080/images/abc-shoe.png");
        assert!(fs::metadata(&image.local_path).await.is_ok());
        assert!(fs::metadata(&staged).await.is_err());

        store.remove(&image.local_path).await?;
        assert!(fs::metadata(&image.local_path).await.is_err());

        let _ = fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_upload_is_not_usable() -> Result<(), anyhow::Error> {
        let root = scratch_dir();
        fs::create_dir_all(&root).await?;
        let staged = root.join("empty.png");
        fs::write(&staged, b"").await?;

        let store = LocalMediaStore::new(root.join("images"), "http://localhost:8080");
        assert!(store.upload(&staged).await?.is_none());

        let _ = fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn remove_rejects_paths_outside_images_dir() {
        let store = LocalMediaStore::new(scratch_dir().join("images"), "http://localhost:8080");
        let err = store.remove("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, MediaError::Rejected(_)));
    }

    #[tokio::test]
    async fn remove_missing_file_is_an_error() {
        let images = scratch_dir().join("images");
        let store = LocalMediaStore::new(&images, "http://localhost:8080");
        let missing = images.join("gone.png");
        assert!(matches!(store.remove(&missing.to_string_lossy()).await, Err(MediaError::Io(_))));
    }
}
