pub mod audio;
pub mod capture;
pub mod config;
pub mod http;
pub mod session;
pub mod store;
pub mod transport;
pub mod video;

pub use audio::{
    decode_audio, encode_pcm, pcm_payload, AudioBlock, AudioCaptureConfig, AudioCaptureSource,
    AudioInput, AudioSourceFactory, DecodedAudio, PlaybackScheduler, PlaybackSink, PlaybackVoice,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    ControllerConfig, FactoryDevices, LiveSessionController, MediaDeviceProvider, SessionSettings,
    SessionStatus, TranscriptAccumulator,
};
pub use store::{
    ClientMetadata, CloseStatus, MemoryStore, NewSession, PersistenceGateway, RecordedStatus,
    SessionDetail, SessionRecord, SessionStore, SessionSummary, Speaker, TranscriptEntry,
};
pub use transport::{
    ConnectOptions, LiveTransport, MediaPayload, NatsConnector, ServerEvent, TransportConnector,
};
pub use video::{VideoCaptureSource, VideoInput, VideoSourceFactory};
