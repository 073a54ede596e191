//! Delivery transport for event batches
//!
//! The [`Transport`] trait is the seam between the dispatch engine and the
//! wire: the engine hands it a batch, the transport reports success or a
//! classified failure. Retry is the engine's responsibility, so a transport
//! must never retry internally; it must, however, bound each attempt with
//! its own request timeout.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Event;

/// Sends a batch of events to a remote ingestion endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt delivery of one batch. One call is one attempt.
    async fn send(&self, events: &[Event]) -> Result<()>;
}
