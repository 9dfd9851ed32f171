use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    CloseStatus, NewSession, RecordedStatus, SessionDetail, SessionRecord, SessionStore,
    SessionSummary, Speaker, TranscriptEntry,
};

struct StoredSession {
    record: SessionRecord,
    messages: Vec<TranscriptEntry>,
}

/// In-memory reference store (session_id -> session + ordered messages).
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, StoredSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, new: NewSession) -> Result<String> {
        let id = format!("session-{}", uuid::Uuid::new_v4());

        let record = SessionRecord {
            id: id.clone(),
            user_id: new.user_id,
            model_name: new.model_name,
            started_at: Utc::now(),
            ended_at: None,
            status: RecordedStatus::Active,
            duration_secs: None,
            client: new.client,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            StoredSession {
                record,
                messages: Vec::new(),
            },
        );

        Ok(id)
    }

    async fn append_message(
        &self,
        session_id: &str,
        sender: Speaker,
        text: &str,
    ) -> Result<String> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| anyhow::anyhow!("unknown session: {}", session_id))?;

        let entry = TranscriptEntry {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            session_id: session_id.to_string(),
            sender,
            text: text.to_string(),
            created_at: Utc::now(),
        };

        let id = entry.id.clone();
        session.messages.push(entry);

        Ok(id)
    }

    async fn close_session(&self, session_id: &str, status: CloseStatus) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| anyhow::anyhow!("unknown session: {}", session_id))?;

        if session.record.ended_at.is_some() {
            debug!("Session {} already closed, ignoring", session_id);
            return Ok(());
        }

        let ended_at = Utc::now();
        session.record.duration_secs = Some(
            (ended_at - session.record.started_at).num_milliseconds() as f64 / 1000.0,
        );
        session.record.ended_at = Some(ended_at);
        session.record.status = status.into();

        Ok(())
    }

    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.read().await;

        let mut summaries: Vec<SessionSummary> = sessions
            .values()
            .filter(|s| s.record.user_id == user_id)
            .map(|s| SessionSummary {
                id: s.record.id.clone(),
                model_name: s.record.model_name.clone(),
                started_at: s.record.started_at,
                ended_at: s.record.ended_at,
                status: s.record.status,
                message_count: s.messages.len(),
            })
            .collect();

        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(summaries)
    }

    async fn session_detail(&self, session_id: &str) -> Result<Option<SessionDetail>> {
        let sessions = self.sessions.read().await;

        Ok(sessions.get(session_id).map(|s| SessionDetail {
            session: s.record.clone(),
            messages: s.messages.clone(),
        }))
    }
}
