//! In-memory event buffer
//!
//! Accumulates validated events until the batch-size threshold is reached
//! or a dispatch drains it. The buffer itself is not thread-safe; the
//! repository serializes all access behind a single lock.

use crate::error::Result;
use crate::types::{Batch, Event};

/// Ordered in-memory accumulation of events awaiting dispatch
pub struct EventBuffer {
    events: Vec<Event>,
    batch_size: usize,
}

impl EventBuffer {
    pub fn new(batch_size: usize) -> Self {
        Self {
            events: Vec::with_capacity(batch_size),
            batch_size,
        }
    }

    /// Validate and append an event, returning the new buffer length.
    ///
    /// Invalid events are rejected here and never buffered, stored, or
    /// sent. When the returned length reaches the batch size the caller
    /// must dispatch before returning to the producer.
    pub fn add(&mut self, event: Event) -> Result<usize> {
        event.validate()?;
        self.events.push(event);
        Ok(self.events.len())
    }

    /// Atomically detach and return all buffered events, leaving the
    /// buffer empty.
    pub fn drain(&mut self) -> Batch {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
