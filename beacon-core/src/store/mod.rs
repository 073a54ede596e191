//! Durable storage for the offline queue
//!
//! The [`EventStore`] trait is the persistence seam: a bounded, ordered
//! list of serialized events, atomic at whole-collection granularity. The
//! store is only ever touched through the offline queue's serialized
//! operations, never directly by the buffer or the retry sender.

mod sqlite;

pub use sqlite::SqliteStore;

use std::sync::Mutex;

use crate::error::Result;
use crate::types::Event;

/// Persists the offline queue's event list.
///
/// `write_all` replaces the entire stored list; partial writes must never
/// be observable.
pub trait EventStore: Send + Sync {
    /// Read the full persisted list, oldest first.
    fn read_all(&self) -> Result<Vec<Event>>;

    /// Replace the persisted list with the given events.
    fn write_all(&self, events: &[Event]) -> Result<()>;

    /// Remove the entire persisted list.
    fn clear(&self) -> Result<()>;
}

/// In-memory store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryStore {
    events: Mutex<Vec<Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<Event>> {
        Ok(self.events.lock().unwrap().clone())
    }

    fn write_all(&self, events: &[Event]) -> Result<()> {
        *self.events.lock().unwrap() = events.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.events.lock().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.read_all().unwrap().is_empty());

        let events = vec![Event::new("a"), Event::new("b")];
        store.write_all(&events).unwrap();
        assert_eq!(store.read_all().unwrap(), events);

        store.clear().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_write_all_replaces() {
        let store = MemoryStore::new();
        store.write_all(&[Event::new("a")]).unwrap();
        store.write_all(&[Event::new("b")]).unwrap();

        let stored = store.read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "b");
    }
}
