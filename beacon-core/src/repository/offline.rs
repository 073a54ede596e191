//! Bounded offline queue layered on the durable store
//!
//! Holds events that exhausted their delivery retries until the caller
//! explicitly resumes or clears them. Insertion-ordered; once the
//! configured capacity is reached the single oldest entry is evicted
//! before each append (FIFO eviction, enforced incrementally per append,
//! not by a bulk pre-trim).

use tokio::sync::Mutex;

use crate::error::Result;
use crate::store::EventStore;
use crate::types::Event;

/// Capacity-bounded, FIFO-evicting durable log of undelivered events
pub struct OfflineQueue {
    /// All store access goes through this lock so append+evict stays
    /// atomic per call across concurrent batches.
    store: Mutex<Box<dyn EventStore>>,
    capacity: usize,
}

impl OfflineQueue {
    pub fn new(store: Box<dyn EventStore>, capacity: usize) -> Self {
        Self {
            store: Mutex::new(store),
            capacity,
        }
    }

    /// Append a batch, event by event, in order.
    ///
    /// Each append re-reads and rewrites the persisted list; eviction
    /// happens at most once per append. The lock is held for the whole
    /// batch, so two concurrent enqueues never interleave.
    pub async fn enqueue(&self, batch: &[Event]) -> Result<()> {
        let store = self.store.lock().await;

        for event in batch {
            let mut stored = store.read_all()?;
            if stored.len() >= self.capacity {
                // Evict the single oldest entry
                stored.remove(0);
            }
            stored.push(event.clone());
            store.write_all(&stored)?;
        }

        tracing::debug!(events = batch.len(), "Appended batch to offline queue");
        Ok(())
    }

    /// Return the full persisted list, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Event>> {
        let store = self.store.lock().await;
        store.read_all()
    }

    /// Number of persisted events.
    pub async fn count(&self) -> Result<usize> {
        let store = self.store.lock().await;
        Ok(store.read_all()?.len())
    }

    /// Remove the entire persisted list.
    pub async fn clear(&self) -> Result<()> {
        let store = self.store.lock().await;
        store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn queue(capacity: usize) -> OfflineQueue {
        OfflineQueue::new(Box::new(MemoryStore::new()), capacity)
    }

    fn names(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_enqueue_preserves_order() {
        let queue = queue(10);
        queue
            .enqueue(&[Event::new("a"), Event::new("b"), Event::new("c")])
            .await
            .unwrap();

        let stored = queue.list_all().await.unwrap();
        assert_eq!(names(&stored), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_first() {
        let queue = queue(3);
        queue
            .enqueue(&[
                Event::new("a"),
                Event::new("b"),
                Event::new("c"),
                Event::new("d"),
            ])
            .await
            .unwrap();

        let stored = queue.list_all().await.unwrap();
        assert_eq!(names(&stored), vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_eviction_across_multiple_calls() {
        let queue = queue(3);
        queue
            .enqueue(&[Event::new("a"), Event::new("b"), Event::new("c")])
            .await
            .unwrap();
        queue.enqueue(&[Event::new("d")]).await.unwrap();

        let stored = queue.list_all().await.unwrap();
        assert_eq!(names(&stored), vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_batch_larger_than_capacity_keeps_newest() {
        let queue = queue(2);
        queue
            .enqueue(&[
                Event::new("a"),
                Event::new("b"),
                Event::new("c"),
                Event::new("d"),
            ])
            .await
            .unwrap();

        let stored = queue.list_all().await.unwrap();
        assert_eq!(names(&stored), vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_clear_then_count() {
        let queue = queue(10);
        queue.enqueue(&[Event::new("a")]).await.unwrap();
        assert_eq!(queue.count().await.unwrap(), 1);

        queue.clear().await.unwrap();
        assert_eq!(queue.count().await.unwrap(), 0);
    }
}
