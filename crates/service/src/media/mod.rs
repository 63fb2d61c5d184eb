//! Media store abstraction for product images.
//!
//! A store takes a file staged on local disk and makes it durable, handing
//! back the public url plus the handle needed to delete it later.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

pub use models::product::ProductImage;

pub mod local;
pub mod mock;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rejected path: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the file at `local_path`. `Ok(None)` means nothing usable was stored.
    async fn upload(&self, local_path: &Path) -> Result<Option<ProductImage>, MediaError>;

    /// Delete a file previously returned by [`MediaStore::upload`].
    async fn remove(&self, local_path: &str) -> Result<(), MediaError>;
}

/// A client upload written to the staging directory.
///
/// Owns the staged file: dropping it removes the file unless
/// [`StagedFile::discard`] already did, so an abandoned request leaves nothing
/// behind in the staging directory.
#[derive(Debug, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub original_name: String,
    pub content_type: Option<String>,
    pub size: u64,
    released: bool,
}

impl StagedFile {
    pub fn new(path: PathBuf, original_name: String, content_type: Option<String>) -> Self {
        Self { path, original_name, content_type, size: 0, released: false }
    }

    /// Remove the staged copy if it is still there.
    pub async fn discard(mut self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "discarded staged upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!(path = %self.path.display(), error = %e, "could not discard staged upload"),
        }
        self.released = true;
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // a single unlink; the media store usually moved the file already
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed abandoned staged upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not remove staged upload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn staged_on_disk() -> StagedFile {
        let path = std::env::temp_dir().join(format!("catalog_staged_{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"png").await.unwrap();
        StagedFile::new(path, "shoe.png".into(), Some("image/png".into()))
    }

    #[tokio::test]
    async fn dropping_removes_the_staged_file() {
        let staged = staged_on_disk().await;
        let path = staged.path.clone();
        drop(staged);
        assert!(tokio::fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn discard_removes_the_staged_file() {
        let staged = staged_on_disk().await;
        let path = staged.path.clone();
        staged.discard().await;
        assert!(tokio::fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn abandoned_future_still_removes_the_staged_file() {
        let staged = staged_on_disk().await;
        let path = staged.path.clone();
        let task = tokio::spawn(async move {
            let _held = staged;
            std::future::pending::<()>().await;
        });
        tokio::task::yield_now().await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(tokio::fs::metadata(&path).await.is_err());
    }
}
