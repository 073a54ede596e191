//! Retry sender: delivery with exponential backoff and offline fallback
//!
//! Attempts transport delivery of one batch, retrying on any failure with
//! exponentially growing delays. Classified transport failures and
//! unexpected ones take the same backoff path. Once retries are exhausted
//! the full batch is handed to the offline queue, or dropped with a
//! terminal error when the fallback is disabled.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::Batch;

use super::offline::OfflineQueue;
use super::DispatchOutcome;

/// Delivers batches via the transport, retrying with exponential backoff
pub struct RetrySender {
    transport: Arc<dyn Transport>,
    /// Retry attempts after the initial send
    max_retries: usize,
    /// First backoff delay; doubles after every failed attempt, with no
    /// upper cap, so a long outage grows the delay unboundedly
    initial_delay: Duration,
    /// Fallback queue; `None` means exhausted batches are dropped
    offline: Option<Arc<OfflineQueue>>,
}

impl RetrySender {
    pub fn new(
        transport: Arc<dyn Transport>,
        max_retries: usize,
        initial_delay: Duration,
        offline: Option<Arc<OfflineQueue>>,
    ) -> Self {
        Self {
            transport,
            max_retries,
            initial_delay,
            offline,
        }
    }

    /// Deliver one non-empty batch.
    ///
    /// The backoff sleeps suspend only this call; other batches and the
    /// buffer are unaffected. The batch is owned by this call for its
    /// entire lifetime.
    pub async fn deliver(&self, batch: Batch) -> Result<DispatchOutcome> {
        let mut delay = self.initial_delay;
        let mut attempts = 0usize;

        let last_error = loop {
            match self.transport.send(&batch).await {
                Ok(()) => {
                    tracing::debug!(
                        events = batch.len(),
                        attempts = attempts + 1,
                        "Batch delivered"
                    );
                    return Ok(DispatchOutcome::Delivered);
                }
                Err(e) => {
                    attempts += 1;
                    if attempts > self.max_retries {
                        break e;
                    }
                    tracing::warn!(
                        error = %e,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Send failed, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        };

        match &self.offline {
            Some(queue) => {
                // Unconditional handoff of the full original batch; a
                // storage failure here surfaces instead of being swallowed.
                queue.enqueue(&batch).await?;
                tracing::info!(
                    events = batch.len(),
                    attempts,
                    "Retries exhausted, batch stored offline"
                );
                Ok(DispatchOutcome::StoredOffline)
            }
            None => {
                tracing::error!(
                    events = batch.len(),
                    attempts,
                    error = %last_error,
                    "Retries exhausted with offline fallback disabled, dropping batch"
                );
                Err(Error::Delivery {
                    attempts,
                    message: last_error.to_string(),
                })
            }
        }
    }
}
