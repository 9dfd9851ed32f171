use serde::{Deserialize, Serialize};

/// Outbound media chunk sent to the reasoning service.
///
/// Audio payloads carry `audio/pcm;rate=<hz>`, video frames `image/jpeg`.
/// `data` is always the base64 transport encoding of the raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    pub mime_type: String,
    pub data: String,
}

/// Inbound event streamed from the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Partial transcription of what the user is saying.
    InputTranscription { text: String },
    /// Partial transcription of what the model is saying.
    OutputTranscription { text: String },
    /// The current input/output exchange is complete.
    TurnComplete,
    /// One chunk of synthesized model speech (base64 PCM).
    AudioChunk { data: String },
    /// The model was interrupted; pending playback is stale.
    Interrupted,
    /// Transport-level failure.
    Error { message: String },
    /// The service closed the stream gracefully.
    Closed,
}
