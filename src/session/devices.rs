use anyhow::Result;

use crate::audio::source::{AudioCaptureConfig, AudioCaptureSource, AudioInput, AudioSourceFactory};
use crate::video::{VideoCaptureSource, VideoInput, VideoSourceFactory};

/// Acquires capture devices for one session.
///
/// The controller owns the returned handles exclusively; acquisition failure
/// is fatal to session start and never reaches the store.
#[async_trait::async_trait]
pub trait MediaDeviceProvider: Send + Sync {
    async fn open_audio(&self, config: &AudioCaptureConfig) -> Result<Box<dyn AudioCaptureSource>>;

    async fn open_video(&self) -> Result<Box<dyn VideoCaptureSource>>;
}

/// Factory-backed provider wiring the configured input selectors.
pub struct FactoryDevices {
    pub audio_input: AudioInput,
    pub video_input: VideoInput,
}

#[async_trait::async_trait]
impl MediaDeviceProvider for FactoryDevices {
    async fn open_audio(&self, config: &AudioCaptureConfig) -> Result<Box<dyn AudioCaptureSource>> {
        AudioSourceFactory::create(self.audio_input.clone(), config.clone())
    }

    async fn open_video(&self) -> Result<Box<dyn VideoCaptureSource>> {
        let mut source = VideoSourceFactory::create(self.video_input.clone())?;
        source.open().await?;
        Ok(source)
    }
}
