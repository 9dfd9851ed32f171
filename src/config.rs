use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub video: VideoConfig,
    pub transport: TransportConfig,
    pub session: SessionDefaults,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Capture/wire rate for outbound PCM
    pub input_sample_rate: u32,
    /// Playback rate for inbound model speech
    pub output_sample_rate: u32,
    /// Samples per capture block
    pub block_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct VideoConfig {
    /// Frames per second for the video pump
    pub frame_rate: f64,
    /// JPEG quality factor (0-100)
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize)]
pub struct TransportConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionDefaults {
    pub model_name: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
