use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::messages::{MediaPayload, ServerEvent};
use super::{ConnectOptions, LiveTransport, TransportConnector};

/// NATS-backed live transport.
///
/// Media chunks are published to `live.media.session-<key>`; server events
/// are consumed from `live.events.session-<key>`. The relay bridging these
/// subjects to the reasoning service is external.
pub struct NatsConnector {
    url: String,
}

impl NatsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait::async_trait]
impl TransportConnector for NatsConnector {
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<(Arc<dyn LiveTransport>, mpsc::Receiver<ServerEvent>)> {
        info!("Connecting to live relay at {}", self.url);

        let client = async_nats::connect(&self.url)
            .await
            .context("failed to connect to live relay")?;

        let events_subject = format!("live.events.session-{}", options.session_key);
        let mut subscriber = client
            .subscribe(events_subject.clone())
            .await
            .context("failed to subscribe to server events")?;

        info!(
            "Live transport open: model={}, voice={}, events={}",
            options.model_name, options.voice_name, events_subject
        );

        let (event_tx, event_rx) = mpsc::channel(256);

        // Forward inbound messages in arrival order. A dropped connection
        // without an explicit Closed event still surfaces as Closed.
        tokio::spawn(async move {
            let mut saw_closed = false;

            while let Some(msg) = subscriber.next().await {
                match serde_json::from_slice::<ServerEvent>(&msg.payload) {
                    Ok(event) => {
                        saw_closed = matches!(event, ServerEvent::Closed);
                        if event_tx.send(event).await.is_err() {
                            return;
                        }
                        if saw_closed {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to parse server event: {}", e);
                    }
                }
            }

            if !saw_closed {
                let _ = event_tx.send(ServerEvent::Closed).await;
            }
        });

        let transport = NatsLiveTransport {
            client,
            media_subject: format!("live.media.session-{}", options.session_key),
        };

        Ok((Arc::new(transport), event_rx))
    }
}

struct NatsLiveTransport {
    client: async_nats::Client,
    media_subject: String,
}

#[async_trait::async_trait]
impl LiveTransport for NatsLiveTransport {
    async fn send_media(&self, payload: MediaPayload) -> Result<()> {
        let bytes = serde_json::to_vec(&payload)?;

        self.client
            .publish(self.media_subject.clone(), bytes.into())
            .await
            .context("failed to publish media chunk")?;

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // async-nats tears the connection down on drop; flush what's queued.
        self.client
            .flush()
            .await
            .context("failed to flush live relay connection")?;
        Ok(())
    }
}
