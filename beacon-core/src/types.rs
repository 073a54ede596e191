//! Core domain types for beacon
//!
//! An [`Event`] is a single named occurrence reported by application code.
//! Events are immutable once created: the builder methods consume `self`,
//! and nothing mutates an event after it enters the buffer.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | A reported occurrence with a name, timestamp, and optional context |
//! | **Batch** | An ordered set of events drained together for one dispatch attempt |
//! | **Dispatch** | Draining the buffer and attempting delivery of the resulting batch |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum length (in characters) for event names and screen names
pub const MAX_FIELD_LEN: usize = 255;

/// A single reported occurrence.
///
/// The wire shape matches the ingestion convention used by the reference
/// collaborators: `id, name, timestamp, screen_name?, properties?,
/// user_id?, session_id?`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Opaque unique token, generated at creation, never reused
    pub id: String,

    /// Event name (non-empty, at most [`MAX_FIELD_LEN`] characters)
    pub name: String,

    /// When the event occurred (set at creation)
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,

    /// Screen or view the event was reported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,

    /// Arbitrary event properties (insertion order irrelevant)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    /// User the event is attributed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Session the event belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Event {
    /// Create a new event with a fresh id and the current timestamp.
    ///
    /// The name is not validated here; validation happens when the event
    /// is recorded, so an invalid event never enters the buffer.
    pub fn new(name: impl Into<String>) -> Self {
        Event {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            occurred_at: Utc::now(),
            screen_name: None,
            properties: Map::new(),
            user_id: None,
            session_id: None,
        }
    }

    /// Attach a screen name.
    pub fn with_screen_name(mut self, screen_name: impl Into<String>) -> Self {
        self.screen_name = Some(screen_name.into());
        self
    }

    /// Attach a single property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Attribute the event to a user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach a session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Check the validity invariant: non-empty name, name and screen name
    /// at most [`MAX_FIELD_LEN`] characters.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Validation("event name must not be empty".to_string()));
        }
        if self.name.chars().count() > MAX_FIELD_LEN {
            return Err(Error::Validation(format!(
                "event name exceeds {} characters",
                MAX_FIELD_LEN
            )));
        }
        if let Some(screen) = &self.screen_name {
            if screen.chars().count() > MAX_FIELD_LEN {
                return Err(Error::Validation(format!(
                    "screen name exceeds {} characters",
                    MAX_FIELD_LEN
                )));
            }
        }
        Ok(())
    }
}

/// An ordered batch of events drained together for one dispatch attempt.
///
/// Ownership transfers fully from the buffer to the dispatch path; a batch
/// is handed to exactly one in-flight deliver at a time.
pub type Batch = Vec<Event>;
