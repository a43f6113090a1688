use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::SaveError;
use crate::meals::Meal;
use crate::storage::ArchiveBackend;
use crate::store::{write_snapshot, MealStore};

/// A copy of the collection, numbered in the order it was taken.
pub struct Snapshot {
    seq: u64,
    meals: Vec<Meal>,
}

impl Snapshot {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Serializes every write to one archive. Snapshots are numbered when taken;
/// a snapshot older than the last one written is skipped, so the archive
/// always reflects the newest collection that reached it.
pub struct ArchiveWriter {
    archive: Arc<dyn ArchiveBackend>,
    attempts: u32,
    next_seq: AtomicU64,
    written: Mutex<u64>,
}

impl ArchiveWriter {
    pub fn new(archive: Arc<dyn ArchiveBackend>, attempts: u32) -> Self {
        Self {
            archive,
            attempts,
            next_seq: AtomicU64::new(1),
            written: Mutex::new(0),
        }
    }

    pub fn snapshot(&self, meals: Vec<Meal>) -> Snapshot {
        Snapshot {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
            meals,
        }
    }

    /// Newest sequence number persisted so far, 0 before the first write.
    pub async fn last_written(&self) -> u64 {
        *self.written.lock().await
    }

    pub async fn write(&self, snapshot: Snapshot) -> Result<(), SaveError> {
        let mut written = self.written.lock().await;
        if snapshot.seq <= *written {
            debug!(seq = snapshot.seq, newest = *written, "skipping superseded snapshot");
            return Ok(());
        }
        write_snapshot(self.archive.as_ref(), &snapshot.meals, self.attempts).await?;
        *written = snapshot.seq;
        Ok(())
    }
}

struct SaveJob {
    snapshot: Snapshot,
    done: oneshot::Sender<Result<(), SaveError>>,
}

/// Background saves through an [`ArchiveWriter`]. Jobs run one at a time in
/// enqueue order; direct `save_all` calls on the same writer are ordered
/// against them by snapshot number.
#[derive(Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveJob>,
    writer: Arc<ArchiveWriter>,
}

/// Completion of one queued save.
pub struct SaveTicket(oneshot::Receiver<Result<(), SaveError>>);

impl SaveTicket {
    pub async fn wait(self) -> Result<(), SaveError> {
        self.0.await.unwrap_or(Err(SaveError::QueueClosed))
    }
}

impl SaveQueue {
    /// Spawns the writer task on the current tokio runtime.
    pub fn spawn(writer: Arc<ArchiveWriter>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SaveJob>();
        let task_writer = writer.clone();
        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let res = task_writer.write(job.snapshot).await;
                if job.done.send(res).is_err() {
                    debug!("save result dropped; caller stopped waiting");
                }
            }
            info!("save queue closed");
        });
        (Self { tx, writer }, handle)
    }

    pub fn for_store(store: &MealStore) -> (Self, JoinHandle<()>) {
        Self::spawn(store.writer())
    }

    /// Numbers `meals` now and queues it for writing.
    pub fn enqueue(&self, meals: Vec<Meal>) -> SaveTicket {
        let snapshot = self.writer.snapshot(meals);
        let (done, rx) = oneshot::channel();
        // on a closed queue the job is dropped and the ticket reports QueueClosed
        let _ = self.tx.send(SaveJob { snapshot, done });
        SaveTicket(rx)
    }
}

impl MealStore {
    /// Queues a snapshot of the current collection for a background save.
    pub fn save_in_background(&self, queue: &SaveQueue) -> SaveTicket {
        queue.enqueue(self.meals().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SaveError;
    use crate::config::StoreConfig;
    use crate::meals::codec;
    use crate::state::AppState;
    use crate::storage::MemoryArchive;
    use crate::store::tests::FlakyArchive;

    fn meal(name: &str, rating: i64) -> Meal {
        Meal::new(name, None, rating).unwrap()
    }

    #[tokio::test]
    async fn saves_land_in_enqueue_order() {
        let mut store = MealStore::new(&AppState::fake());
        let (queue, _handle) = SaveQueue::for_store(&store);

        let mut tickets = Vec::new();
        for (i, name) in ["A", "B", "C"].into_iter().enumerate() {
            store.insert(meal(name, i as i64));
            tickets.push(store.save_in_background(&queue));
        }
        store.remove_at(0).unwrap();
        tickets.push(store.save_in_background(&queue));

        for t in tickets {
            t.wait().await.unwrap();
        }
        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded, store.meals());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name(), "B");
    }

    #[tokio::test]
    async fn failed_save_is_reported_to_ticket() {
        let archive = Arc::new(FlakyArchive::new(usize::MAX));
        let (queue, _handle) = SaveQueue::spawn(Arc::new(ArchiveWriter::new(archive, 2)));

        let err = queue.enqueue(vec![meal("A", 1)]).wait().await.unwrap_err();
        assert!(matches!(err, SaveError::Io { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn closed_queue_reports_queue_closed() {
        let store = MealStore::new(&AppState::fake());
        let (queue, handle) = SaveQueue::for_store(&store);
        handle.abort();
        let _ = handle.await;

        let err = store.save_in_background(&queue).wait().await.unwrap_err();
        assert!(matches!(err, SaveError::QueueClosed));
    }

    #[tokio::test]
    async fn direct_save_not_overwritten_by_older_queued_snapshot() {
        let mut store = MealStore::new(&AppState::fake());
        let (queue, _handle) = SaveQueue::for_store(&store);

        store.insert(meal("A", 1));
        let ticket = store.save_in_background(&queue);
        store.insert(meal("B", 2));
        store.save_all().await.unwrap();
        ticket.wait().await.unwrap();

        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), store.len());
        assert_eq!(loaded, store.meals());
    }

    #[tokio::test]
    async fn stale_snapshot_is_skipped() {
        let archive = Arc::new(MemoryArchive::new());
        let writer = ArchiveWriter::new(archive.clone(), 1);

        let older = writer.snapshot(vec![meal("Old", 1)]);
        let newer = writer.snapshot(vec![meal("Old", 1), meal("New", 2)]);
        writer.write(newer).await.unwrap();
        writer.write(older).await.unwrap();

        assert_eq!(writer.last_written().await, 2);
        assert_eq!(archive.write_count().await, 1);
        let raw = archive.contents().await.unwrap();
        assert_eq!(codec::decode_archive(&raw).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn file_archive_keeps_newest_across_both_paths() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let state = AppState::with_config(StoreConfig::new(dir.path().join("meals.json")));
        let mut store = MealStore::new(&state);
        let (queue, _handle) = SaveQueue::for_store(&store);

        let mut tickets = Vec::new();
        for i in 0..5 {
            store.insert(meal("M", i));
            tickets.push(store.save_in_background(&queue));
        }
        store.insert(meal("Last", 9));
        store.save_all().await.unwrap();
        for t in tickets {
            t.wait().await.unwrap();
        }

        let reopened = MealStore::new(&state);
        let loaded = reopened.load_all().await.unwrap();
        assert_eq!(loaded.len(), 6);
        assert_eq!(loaded[5].name(), "Last");
    }
}
