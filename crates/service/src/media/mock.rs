//! In-memory media store for tests and doc examples.
//!
//! Records every call and never touches the filesystem.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{MediaError, MediaStore, ProductImage};

#[derive(Default)]
pub struct RecordingMediaStore {
    uploads: Mutex<Vec<PathBuf>>,
    removals: Mutex<Vec<String>>,
    counter: AtomicUsize,
    unusable_uploads: AtomicBool,
    failing_removals: AtomicBool,
}

impl RecordingMediaStore {
    /// Make every upload return `Ok(None)`.
    pub fn reject_uploads(&self) { self.unusable_uploads.store(true, Ordering::SeqCst); }

    /// Make every removal fail (calls are still recorded).
    pub fn fail_removals(&self) { self.failing_removals.store(true, Ordering::SeqCst); }

    pub async fn uploads(&self) -> Vec<PathBuf> { self.uploads.lock().await.clone() }

    pub async fn removals(&self) -> Vec<String> { self.removals.lock().await.clone() }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, local_path: &Path) -> Result<Option<ProductImage>, MediaError> {
        self.uploads.lock().await.push(local_path.to_path_buf());
        if self.unusable_uploads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let name = local_path.file_name().and_then(|n| n.to_str()).unwrap_or("upload");
        Ok(Some(ProductImage {
            url: format!("mock://images/{n}-{name}"),
            local_path: format!("mock/{n}-{name}"),
        }))
    }

    async fn remove(&self, local_path: &str) -> Result<(), MediaError> {
        self.removals.lock().await.push(local_path.to_string());
        if self.failing_removals.load(Ordering::SeqCst) {
            return Err(MediaError::Io(std::io::Error::new(std::io::ErrorKind::Other, "mock removal failure")));
        }
        Ok(())
    }
}
