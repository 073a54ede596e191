//! # beacon-core
//!
//! Core library for beacon - a client-side telemetry buffering engine.
//!
//! This library provides:
//! - An immutable [`Event`] model with validation
//! - In-memory batching with threshold, interval, and explicit-flush dispatch
//! - Delivery retry with exponential backoff
//! - A bounded, FIFO-evicting offline queue for undeliverable batches
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Application code records events into an [`EventRepository`]; the
//! repository batches them and ships batches through a [`transport::Transport`].
//! When delivery keeps failing, batches are persisted via a
//! [`store::EventStore`] until the caller resumes or clears them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use beacon_core::{Config, Event, EventRepository};
//! use beacon_core::store::SqliteStore;
//! use beacon_core::transport::HttpTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> beacon_core::Result<()> {
//! let config = Config::load()?;
//!
//! let transport = Arc::new(HttpTransport::new(&config.telemetry)?);
//! let store = Box::new(SqliteStore::open(&Config::queue_path())?);
//! let repository = EventRepository::new(&config.telemetry, transport, store)?;
//!
//! repository.record(Event::new("app_started")).await?;
//! repository.flush().await?;
//! repository.dispose();
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, TelemetryConfig};
pub use error::{Error, Result};
pub use repository::{DispatchOutcome, EventRepository};
pub use types::{Batch, Event};

// Public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod store;
pub mod transport;
pub mod types;
