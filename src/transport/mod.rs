//! Live transport abstraction.
//!
//! The remote inference connection itself is an external collaborator; the
//! controller only consumes a send/receive seam. `TransportConnector::connect`
//! returning is the "open confirmed" signal, `send_media` carries outbound
//! chunks, and inbound traffic arrives as a stream of `ServerEvent`s.

pub mod messages;
pub mod nats;

pub use messages::{MediaPayload, ServerEvent};
pub use nats::NatsConnector;

use anyhow::Result;
use tokio::sync::mpsc;

/// Options for opening one live session stream.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Client-generated key scoping this session's subjects/streams
    pub session_key: String,
    pub model_name: String,
    pub voice_name: String,
}

/// An open, confirmed live connection.
#[async_trait::async_trait]
pub trait LiveTransport: Send + Sync {
    /// Send one media chunk. Callers treat this as best-effort; failures are
    /// logged and the next chunk is sent regardless.
    async fn send_media(&self, payload: MediaPayload) -> Result<()>;

    /// Close the connection. Errors are swallowed by callers.
    async fn close(&self) -> Result<()>;
}

/// Opens live connections.
#[async_trait::async_trait]
pub trait TransportConnector: Send + Sync {
    /// Connect and subscribe; returns the open transport plus the inbound
    /// event stream. Events are delivered in arrival order.
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<(std::sync::Arc<dyn LiveTransport>, mpsc::Receiver<ServerEvent>)>;
}
