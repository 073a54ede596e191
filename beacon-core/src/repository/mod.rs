//! Event repository: buffering, dispatch, retry, and offline fallback
//!
//! This is the orchestration core of the telemetry pipeline:
//!
//! ```text
//! record ──► EventBuffer ──full?──► RetrySender ──► Transport
//!                ▲                      │
//!   timer tick ──┘ (drain)              └─exhausted─► OfflineQueue ──► EventStore
//! ```
//!
//! - Events accumulate in memory and dispatch when the batch size is
//!   reached, when the interval timer fires, or on an explicit flush.
//! - Delivery failures retry with exponential backoff; exhausted batches
//!   land in a bounded, FIFO-evicting offline queue.
//! - Backoff sleeps never block producers: the buffer keeps accepting
//!   events and the timer keeps firing while a batch is mid-retry, so
//!   multiple independent batches can be in flight at once.

mod buffer;
mod offline;
mod sender;

pub use buffer::EventBuffer;
pub use offline::OfflineQueue;
pub use sender::RetrySender;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::TelemetryConfig;
use crate::error::{Error, Result};
use crate::store::EventStore;
use crate::transport::Transport;
use crate::types::Event;

/// Terminal outcome of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The batch reached the ingestion endpoint
    Delivered,
    /// Retries were exhausted and the batch was persisted for later
    StoredOffline,
    /// The buffer was empty; nothing to do
    Skipped,
}

/// Shared state between the facade, the timer task, and in-flight
/// dispatches.
struct RepositoryInner {
    /// All buffer mutations and dispatch-triggering decisions happen
    /// under this one lock, so threshold dispatch and timer dispatch can
    /// never drain overlapping event sets.
    buffer: Mutex<EventBuffer>,
    sender: RetrySender,
    offline: Arc<OfflineQueue>,
    disposed: AtomicBool,
}

impl RepositoryInner {
    /// Drain the buffer and deliver the resulting batch.
    ///
    /// Empty buffer is a no-op, not an error. The drain is atomic with
    /// respect to concurrent `record` calls; once drained the batch is
    /// owned by this dispatch alone.
    async fn dispatch(&self) -> Result<DispatchOutcome> {
        let batch = {
            let mut buffer = self.buffer.lock().unwrap();
            if buffer.is_empty() {
                return Ok(DispatchOutcome::Skipped);
            }
            buffer.drain()
        };

        self.sender.deliver(batch).await
    }
}

/// The telemetry event repository.
///
/// Constructed with a [`Transport`] and an [`EventStore`]; starts its
/// interval dispatch timer immediately, so construction requires a
/// running tokio runtime. Disposal (explicit or on drop) stops the timer;
/// dispatches already in flight are left to finish.
pub struct EventRepository {
    inner: Arc<RepositoryInner>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl EventRepository {
    /// Create a repository and start its dispatch scheduler.
    pub fn new(
        config: &TelemetryConfig,
        transport: Arc<dyn Transport>,
        store: Box<dyn EventStore>,
    ) -> Result<Self> {
        config.validate()?;

        let offline = Arc::new(OfflineQueue::new(store, config.offline_capacity));
        let fallback = config.offline_enabled.then(|| Arc::clone(&offline));
        let sender = RetrySender::new(
            transport,
            config.max_retries,
            Duration::from_millis(config.initial_retry_delay_ms),
            fallback,
        );

        let inner = Arc::new(RepositoryInner {
            buffer: Mutex::new(EventBuffer::new(config.batch_size)),
            sender,
            offline,
            disposed: AtomicBool::new(false),
        });

        let timer = Self::start_scheduler(
            Arc::clone(&inner),
            Duration::from_millis(config.batch_interval_ms),
        );

        Ok(Self {
            inner,
            timer: Mutex::new(Some(timer)),
        })
    }

    /// Spawn the recurring dispatch timer.
    ///
    /// Each tick spawns the dispatch into its own task: aborting the
    /// timer on disposal then leaves a dispatch mid-backoff to complete
    /// its current attempt rather than killing it.
    fn start_scheduler(inner: Arc<RepositoryInner>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                let inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    if let Err(e) = inner.dispatch().await {
                        tracing::warn!(error = %e, "Scheduled dispatch failed");
                    }
                });
            }
        })
    }

    /// Validate and buffer an event.
    ///
    /// When the buffered count reaches the batch size, the full batch is
    /// dispatched before this call returns; with offline fallback
    /// disabled that path can surface a terminal delivery error.
    pub async fn record(&self, event: Event) -> Result<()> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }

        let full_batch = {
            let mut buffer = self.inner.buffer.lock().unwrap();
            let len = buffer.add(event)?;
            (len >= buffer.batch_size()).then(|| buffer.drain())
        };

        if let Some(batch) = full_batch {
            self.inner.sender.deliver(batch).await?;
        }
        Ok(())
    }

    /// Force an immediate dispatch of the current buffer, without
    /// resetting the timer's phase.
    ///
    /// [`DispatchOutcome::StoredOffline`] is a form of success: the events
    /// were not delivered but are safe in the offline queue.
    pub async fn flush(&self) -> Result<DispatchOutcome> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }
        self.inner.dispatch().await
    }

    /// Count of persisted, not-yet-delivered events.
    ///
    /// A storage read failure is downgraded to 0 so a broken store never
    /// blocks this non-critical inspection.
    pub async fn pending_count(&self) -> usize {
        match self.inner.offline.count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read offline queue, reporting 0 pending");
                0
            }
        }
    }

    /// The persisted events themselves, oldest first (for explicit
    /// recovery by the caller).
    pub async fn pending_events(&self) -> Result<Vec<Event>> {
        self.inner.offline.list_all().await
    }

    /// Wipe the persisted offline queue.
    pub async fn clear_pending(&self) -> Result<()> {
        self.inner.offline.clear().await
    }

    /// Stop the dispatch scheduler. Idempotent; also invoked on drop.
    ///
    /// After disposal no timer-driven dispatch occurs and `record`/`flush`
    /// are rejected. Dispatches already in their backoff sleep finish on
    /// their own.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        if let Some(handle) = self.timer.lock().unwrap().take() {
            handle.abort();
        }
    }
}

impl Drop for EventRepository {
    fn drop(&mut self) {
        self.dispose();
    }
}
