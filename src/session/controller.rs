use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::devices::MediaDeviceProvider;
use super::settings::SessionSettings;
use super::transcript::TranscriptAccumulator;
use crate::audio::encode;
use crate::audio::playback::{PlaybackScheduler, PlaybackSink};
use crate::audio::source::{AudioCaptureConfig, AudioCaptureSource};
use crate::capture;
use crate::store::{ClientMetadata, CloseStatus, NewSession, PersistenceGateway, TranscriptEntry};
use crate::transport::{ConnectOptions, LiveTransport, ServerEvent, TransportConnector};
use crate::video::VideoCaptureSource;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Idle,
    Connecting,
    Active,
    Error,
}

/// User-facing bucket for a transport runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// API key / billing problem; blocks new sessions until credentials are
    /// reconfigured.
    Credential,
    /// Transient network problem; restartable immediately.
    Network,
}

/// Classify a transport error message into its user-facing bucket.
pub fn classify_failure(message: &str) -> FailureKind {
    if message.contains("Requested entity was not found") || message.contains("Network error") {
        FailureKind::Credential
    } else {
        FailureKind::Network
    }
}

/// Static wiring for a controller instance.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub model_name: String,
    pub user_id: String,
    pub client: ClientMetadata,
    pub audio: AudioCaptureConfig,
    /// Playback rate of inbound model speech, in Hz
    pub output_sample_rate: u32,
    /// Video pump rate, frames per second
    pub frame_rate: f64,
    pub jpeg_quality: u8,
}

/// Everything owned by one active session, torn down as a unit.
struct ActiveSession {
    running: Arc<AtomicBool>,
    audio_source: Box<dyn AudioCaptureSource>,
    camera: Option<Arc<Mutex<Box<dyn VideoCaptureSource>>>>,
    transport: Arc<dyn LiveTransport>,
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    accumulator: Arc<Mutex<TranscriptAccumulator>>,
    /// Store-side session id, taken (not cloned) by whichever path closes the
    /// record so it is closed exactly once.
    store_id: Arc<Mutex<Option<String>>>,
    session_key: String,
    tasks: Vec<JoinHandle<()>>,
}

/// Owns the session state machine and routes inbound events to the
/// transcript accumulator, the playback scheduler, and the persistence
/// gateway. One controller manages at most one active session.
pub struct LiveSessionController {
    config: ControllerConfig,
    devices: Arc<dyn MediaDeviceProvider>,
    connector: Arc<dyn TransportConnector>,
    sink: Arc<dyn PlaybackSink>,
    gateway: PersistenceGateway,
    status_tx: watch::Sender<SessionStatus>,
    credential_required: AtomicBool,
    last_error: Mutex<Option<String>>,
    active: Mutex<Option<ActiveSession>>,
}

impl LiveSessionController {
    pub fn new(
        config: ControllerConfig,
        devices: Arc<dyn MediaDeviceProvider>,
        connector: Arc<dyn TransportConnector>,
        sink: Arc<dyn PlaybackSink>,
        gateway: PersistenceGateway,
    ) -> Arc<Self> {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);

        Arc::new(Self {
            config,
            devices,
            connector,
            sink,
            gateway,
            status_tx,
            credential_required: AtomicBool::new(false),
            last_error: Mutex::new(None),
            active: Mutex::new(None),
        })
    }

    /// Start a session. Valid only from idle; device acquisition failure
    /// surfaces an error without touching the store, and the controller is
    /// active only once the transport confirms open.
    pub async fn start(self: &Arc<Self>, settings: SessionSettings) -> Result<()> {
        if self.credential_required.load(Ordering::SeqCst) {
            anyhow::bail!("credentials must be reconfigured before starting a new session");
        }

        let mut active = self.active.lock().await;
        if active.is_some() {
            anyhow::bail!("a session is already active");
        }

        self.set_status(SessionStatus::Connecting);
        self.set_last_error(None).await;

        info!(
            "Starting live session (model={}, camera={}, mic={})",
            self.config.model_name, settings.camera_enabled, settings.mic_enabled
        );

        // Capture devices first; a denied device never creates a remote
        // session.
        let mut audio_source = match self.devices.open_audio(&self.config.audio).await {
            Ok(source) => source,
            Err(e) => {
                return self
                    .fail_start(format!("Microphone access failed: {:#}", e), e)
                    .await;
            }
        };

        let blocks = match audio_source.start().await {
            Ok(rx) => rx,
            Err(e) => {
                return self
                    .fail_start(format!("Microphone access failed: {:#}", e), e)
                    .await;
            }
        };

        let camera = if settings.camera_enabled {
            match self.devices.open_video().await {
                Ok(camera) => Some(Arc::new(Mutex::new(camera))),
                Err(e) => {
                    let _ = audio_source.stop().await;
                    return self
                        .fail_start(format!("Camera access failed: {:#}", e), e)
                        .await;
                }
            }
        } else {
            None
        };

        let session_key = uuid::Uuid::new_v4().to_string();
        let options = ConnectOptions {
            session_key: session_key.clone(),
            model_name: self.config.model_name.clone(),
            voice_name: settings.voice_name.clone(),
        };

        let (transport, events) = match self.connector.connect(&options).await {
            Ok(open) => open,
            Err(e) => {
                let _ = audio_source.stop().await;
                if let Some(camera) = &camera {
                    let _ = camera.lock().await.close().await;
                }
                return self
                    .fail_start(format!("Failed to open live connection: {:#}", e), e)
                    .await;
            }
        };

        // Transport confirmed open.
        self.set_status(SessionStatus::Active);

        let store_id = self
            .gateway
            .create_session(NewSession {
                user_id: self.config.user_id.clone(),
                model_name: self.config.model_name.clone(),
                client: self.config.client.clone(),
            })
            .await;
        let store_id = Arc::new(Mutex::new(store_id));

        let running = Arc::new(AtomicBool::new(true));
        let scheduler = Arc::new(Mutex::new(PlaybackScheduler::new(Arc::clone(&self.sink))));
        let accumulator = Arc::new(Mutex::new(TranscriptAccumulator::new()));

        let mut tasks = Vec::new();
        tasks.push(capture::spawn_audio_pump(
            blocks,
            Arc::clone(&transport),
            settings.mic_enabled,
            Arc::clone(&running),
        ));
        if let Some(camera) = &camera {
            tasks.push(capture::spawn_video_pump(
                Arc::clone(camera),
                Arc::clone(&transport),
                self.config.frame_rate,
                self.config.jpeg_quality,
                Arc::clone(&running),
            ));
        }
        tasks.push(self.spawn_event_loop(
            events,
            Arc::clone(&scheduler),
            Arc::clone(&accumulator),
            Arc::clone(&store_id),
            Arc::clone(&running),
            session_key.clone(),
        ));

        *active = Some(ActiveSession {
            running,
            audio_source,
            camera,
            transport,
            scheduler,
            accumulator,
            store_id,
            session_key,
            tasks,
        });

        info!("Live session active");
        Ok(())
    }

    /// Stop the session. Valid from any state and idempotent; always ends in
    /// idle with all transient buffers cleared.
    pub async fn stop(&self) {
        self.shutdown(true).await;
    }

    async fn fail_start(&self, user_message: String, err: anyhow::Error) -> Result<()> {
        warn!("Session start failed: {:#}", err);
        self.set_last_error(Some(user_message)).await;
        self.set_status(SessionStatus::Idle);
        Err(err)
    }

    fn spawn_event_loop(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<ServerEvent>,
        scheduler: Arc<Mutex<PlaybackScheduler>>,
        accumulator: Arc<Mutex<TranscriptAccumulator>>,
        store_id: Arc<Mutex<Option<String>>>,
        running: Arc<AtomicBool>,
        session_key: String,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let output_rate = controller.config.output_sample_rate;

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                match event {
                    ServerEvent::InputTranscription { text } => {
                        accumulator.lock().await.push_input(&text);
                    }
                    ServerEvent::OutputTranscription { text } => {
                        accumulator.lock().await.push_output(&text);
                    }
                    ServerEvent::TurnComplete => {
                        let sid = store_id.lock().await.clone();
                        let turn_session = sid.clone().unwrap_or_else(|| session_key.clone());
                        let entries = accumulator.lock().await.complete_turn(&turn_session);

                        if let Some(sid) = sid {
                            for entry in &entries {
                                controller.gateway.append_message(
                                    sid.clone(),
                                    entry.sender,
                                    entry.text.clone(),
                                );
                            }
                        }
                    }
                    ServerEvent::AudioChunk { data } => {
                        match encode::decode_audio(&data, output_rate) {
                            Ok(audio) => {
                                if let Err(e) = scheduler.lock().await.enqueue(audio) {
                                    warn!("Failed to schedule audio chunk: {:#}", e);
                                }
                            }
                            Err(e) => warn!("Failed to decode audio chunk: {:#}", e),
                        }
                    }
                    ServerEvent::Interrupted => {
                        scheduler.lock().await.interrupt();
                    }
                    ServerEvent::Error { message } => {
                        error!("Live session error: {}", message);

                        // Mark the stored session before teardown resets
                        // state; taking the id keeps the close-once rule.
                        if let Some(sid) = store_id.lock().await.take() {
                            controller.gateway.close_session(sid, CloseStatus::Error);
                        }

                        let user_message = match classify_failure(&message) {
                            FailureKind::Credential => {
                                controller.credential_required.store(true, Ordering::SeqCst);
                                "Session interrupted. Ensure your API key is correct and has billing enabled."
                            }
                            FailureKind::Network => {
                                "Connection lost. Please check your network and try again."
                            }
                        }
                        .to_string();

                        spawn_error_teardown(Arc::clone(&controller), user_message);
                        break;
                    }
                    ServerEvent::Closed => {
                        // Graceful close: back to idle, no extra store calls.
                        info!("Live connection closed by the service");
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            controller.shutdown(false).await;
                        });
                        break;
                    }
                }
            }
        })
    }

    /// Tear down the active session, optionally closing the store record
    /// with `completed`. Safe to call at any time; no-op when already idle.
    async fn shutdown(&self, close_store: bool) {
        let mut guard = self.active.lock().await;
        let Some(mut active) = guard.take() else {
            self.set_status(SessionStatus::Idle);
            return;
        };

        active.running.store(false, Ordering::SeqCst);

        // Cancel pumps and the event dispatcher.
        for task in active.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }

        // Release capture devices.
        if let Err(e) = active.audio_source.stop().await {
            warn!("Failed to stop audio capture: {:#}", e);
        }
        if let Some(camera) = &active.camera {
            if let Err(e) = camera.lock().await.close().await {
                warn!("Failed to release camera: {:#}", e);
            }
        }

        // Silence pending playback.
        active.scheduler.lock().await.interrupt();

        // Close the transport; close errors are swallowed.
        if let Err(e) = active.transport.close().await {
            warn!("Live transport close failed: {:#}", e);
        }

        // Close the stored session exactly once.
        if close_store {
            if let Some(sid) = active.store_id.lock().await.take() {
                self.gateway.close_session(sid, CloseStatus::Completed);
            }
        }

        active.accumulator.lock().await.clear();

        self.set_last_error(None).await;
        self.set_status(SessionStatus::Idle);
        info!("Live session {} stopped", active.session_key);
    }

    // ------------------------------------------------------------------
    // Observers (UI surface)
    // ------------------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// What the user is currently saying (live, unpersisted).
    pub async fn live_input(&self) -> String {
        match &*self.active.lock().await {
            Some(active) => active.accumulator.lock().await.live_input().to_string(),
            None => String::new(),
        }
    }

    /// What the model is currently saying (live, unpersisted).
    pub async fn live_output(&self) -> String {
        match &*self.active.lock().await {
            Some(active) => active.accumulator.lock().await.live_output().to_string(),
            None => String::new(),
        }
    }

    /// Finalized transcript entries of the active session.
    pub async fn history(&self) -> Vec<TranscriptEntry> {
        match &*self.active.lock().await {
            Some(active) => active.accumulator.lock().await.history().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    /// Whether a credential/billing failure is blocking new sessions.
    pub fn credential_required(&self) -> bool {
        self.credential_required.load(Ordering::SeqCst)
    }

    /// Re-arm `start` after credentials were reconfigured.
    pub fn clear_credential_hold(&self) {
        self.credential_required.store(false, Ordering::SeqCst);
    }

    fn set_status(&self, status: SessionStatus) {
        self.status_tx.send_replace(status);
    }

    async fn set_last_error(&self, message: Option<String>) {
        *self.last_error.lock().await = message;
    }
}

/// Error teardown runs off the event loop's own task so the dispatcher can
/// finish; the classified message lands after stop wipes transient state.
fn spawn_error_teardown(controller: Arc<LiveSessionController>, user_message: String) {
    controller.set_status(SessionStatus::Error);
    tokio::spawn(async move {
        controller.shutdown(true).await;
        controller.set_last_error(Some(user_message)).await;
    });
}
