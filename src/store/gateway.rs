use std::sync::Arc;
use tracing::{error, info};

use super::{CloseStatus, NewSession, SessionStore, Speaker};

/// Fire-and-forget adapter between the controller and the store.
///
/// Append and close run as detached tasks that capture the session id by
/// value, so a call issued just before teardown still targets the right
/// session after the controller is back in idle. Failures are logged, never
/// retried, and never surfaced to the live path.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn SessionStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Create the session record at transport-open. Returns None when the
    /// store is unavailable; the live session proceeds without persistence.
    pub async fn create_session(&self, new: NewSession) -> Option<String> {
        match self.store.create_session(new).await {
            Ok(id) => {
                info!("Session record created: {}", id);
                Some(id)
            }
            Err(e) => {
                error!("Failed to create session record: {:#}", e);
                None
            }
        }
    }

    /// Persist one finalized transcript entry.
    pub fn append_message(&self, session_id: String, sender: Speaker, text: String) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.append_message(&session_id, sender, &text).await {
                error!("Failed to persist transcript entry: {:#}", e);
            }
        });
    }

    /// Close the session record with a terminal status.
    pub fn close_session(&self, session_id: String, status: CloseStatus) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.close_session(&session_id, status).await {
                error!("Failed to close session record: {:#}", e);
            }
        });
    }
}
