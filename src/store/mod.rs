//! Session and transcript persistence.
//!
//! The controller only ever talks to the `SessionStore` trait, and only
//! through the fire-and-forget `PersistenceGateway`; storage failures are
//! logged and never reach the live media path.

pub mod gateway;
pub mod memory;

pub use gateway::PersistenceGateway;
pub use memory::MemoryStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Model,
}

/// Recorded lifecycle state of a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordedStatus {
    Active,
    Completed,
    Error,
}

/// Terminal status supplied when closing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseStatus {
    Completed,
    Error,
}

impl From<CloseStatus> for RecordedStatus {
    fn from(status: CloseStatus) -> Self {
        match status {
            CloseStatus::Completed => RecordedStatus::Completed,
            CloseStatus::Error => RecordedStatus::Error,
        }
    }
}

/// Opaque client identity and best-effort geolocation gathered at start.
///
/// Geolocation is optional by design; its absence never blocks session
/// creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub client_identifier: String,
    pub device_type: String,
    pub screen_res: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Payload for creating a session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub user_id: String,
    pub model_name: String,
    #[serde(flatten)]
    pub client: ClientMetadata,
}

/// One stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub model_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: RecordedStatus,
    pub duration_secs: Option<f64>,
    #[serde(flatten)]
    pub client: ClientMetadata,
}

/// One finalized transcript entry. Immutable once created; ordering within a
/// session is the order of creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub session_id: String,
    pub sender: Speaker,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Session summary for history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub model_name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: RecordedStatus,
    pub message_count: usize,
}

/// Full session view: metadata plus ordered messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session: SessionRecord,
    pub messages: Vec<TranscriptEntry>,
}

/// Durable session storage surface.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session record; returns its id.
    async fn create_session(&self, new: NewSession) -> Result<String>;

    /// Append one finalized transcript entry; returns the entry id.
    ///
    /// Appends referencing an already-closed session are accepted: the
    /// controller fires these without waiting and teardown may win the race.
    async fn append_message(&self, session_id: &str, sender: Speaker, text: &str)
        -> Result<String>;

    /// Close a session with a terminal status. The first close wins; later
    /// calls are ignored.
    async fn close_session(&self, session_id: &str, status: CloseStatus) -> Result<()>;

    /// Session summaries for one user, most recent first.
    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<SessionSummary>>;

    /// Full session view, or None if unknown.
    async fn session_detail(&self, session_id: &str) -> Result<Option<SessionDetail>>;
}
