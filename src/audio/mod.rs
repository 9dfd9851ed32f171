pub mod encode;
pub mod playback;
pub mod source;

pub use encode::{decode_audio, encode_pcm, pcm_payload, DecodedAudio};
pub use playback::{PlaybackScheduler, PlaybackSink, PlaybackVoice};
pub use source::{
    AudioBlock, AudioCaptureConfig, AudioCaptureSource, AudioInput, AudioSourceFactory,
};
