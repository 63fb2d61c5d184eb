//! Background reclamation of image files no product references anymore.
//!
//! Callers enqueue a media handle once the database write is settled and move
//! on; a single worker drains the queue and deletes through the media store.
//! Failures end up in the log and nowhere else.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::media::MediaStore;

#[derive(Clone, Debug)]
pub struct CleanupQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl CleanupQueue {
    /// Start the worker. It exits after every clone of the queue is dropped
    /// and the backlog is drained, so awaiting the handle flushes deletions.
    pub fn spawn(media: Arc<dyn MediaStore>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(media, rx));
        (Self { tx }, worker)
    }

    /// Queue `local_path` for deletion.
    pub fn reclaim(&self, local_path: String) {
        if let Err(e) = self.tx.send(local_path) {
            warn!(local_path = %e.0, "cleanup worker gone; image file left behind");
        }
    }

    /// Guard for a freshly stored file that no row references yet. Unless
    /// committed, the file is queued for deletion when the guard drops.
    pub fn guard(&self, local_path: String) -> ReclaimGuard {
        ReclaimGuard { local_path: Some(local_path), queue: self.clone() }
    }
}

#[derive(Debug)]
pub struct ReclaimGuard {
    local_path: Option<String>,
    queue: CleanupQueue,
}

impl ReclaimGuard {
    /// The write referencing the file succeeded; keep it.
    pub fn commit(mut self) {
        self.local_path = None;
    }
}

impl Drop for ReclaimGuard {
    fn drop(&mut self) {
        if let Some(local_path) = self.local_path.take() {
            debug!(%local_path, "stored image has no owning row; reclaiming");
            self.queue.reclaim(local_path);
        }
    }
}

async fn run(media: Arc<dyn MediaStore>, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(local_path) = rx.recv().await {
        match media.remove(&local_path).await {
            Ok(()) => debug!(%local_path, event = "image_reclaimed", "image file reclaimed"),
            Err(e) => warn!(%local_path, error = %e, event = "image_reclaim_failed", "could not delete image file"),
        }
    }
    debug!("cleanup worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock::RecordingMediaStore;

    #[tokio::test]
    async fn drains_backlog_before_stopping() {
        let media = Arc::new(RecordingMediaStore::default());
        let (queue, worker) = CleanupQueue::spawn(media.clone());

        queue.reclaim("a.png".into());
        queue.clone().reclaim("b.png".into());
        drop(queue);
        worker.await.unwrap();

        assert_eq!(media.removals().await, vec!["a.png".to_string(), "b.png".to_string()]);
    }

    #[tokio::test]
    async fn uncommitted_guard_reclaims_on_drop() {
        let media = Arc::new(RecordingMediaStore::default());
        let (queue, worker) = CleanupQueue::spawn(media.clone());

        queue.guard("kept.png".into()).commit();
        drop(queue.guard("orphan.png".into()));
        drop(queue);
        worker.await.unwrap();

        assert_eq!(media.removals().await, vec!["orphan.png".to_string()]);
    }

    #[tokio::test]
    async fn removal_failures_do_not_stop_the_worker() {
        let media = Arc::new(RecordingMediaStore::default());
        media.fail_removals();
        let (queue, worker) = CleanupQueue::spawn(media.clone());

        queue.reclaim("a.png".into());
        queue.reclaim("b.png".into());
        drop(queue);
        worker.await.unwrap();

        assert_eq!(media.removals().await.len(), 2);
    }
}
