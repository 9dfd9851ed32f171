use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// One fixed-size block of captured microphone audio.
///
/// Samples are mono f32 in [-1, 1]; the encoder converts them to wire PCM.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio capture
#[derive(Debug, Clone)]
pub struct AudioCaptureConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Samples per block handed to the pump
    pub block_size: usize,
}

impl Default for AudioCaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz wire input rate
            block_size: 4096,
        }
    }
}

/// Audio capture source trait
///
/// Implementations deliver fixed-size blocks through a channel so a slow
/// consumer never blocks the capture callback itself.
#[async_trait::async_trait]
pub trait AudioCaptureSource: Send {
    /// Start capturing; returns the channel the blocks arrive on.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>>;

    /// Stop capturing and release the device.
    async fn stop(&mut self) -> Result<()>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Audio input selector
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Live microphone (requires a platform audio backend)
    Microphone,
    /// WAV file played back in real time (testing/batch sessions)
    File(PathBuf),
    /// Generated sine tone (demos, wiring checks)
    Tone { frequency_hz: f32 },
}

pub struct AudioSourceFactory;

impl AudioSourceFactory {
    pub fn create(
        input: AudioInput,
        config: AudioCaptureConfig,
    ) -> Result<Box<dyn AudioCaptureSource>> {
        match input {
            AudioInput::Microphone => {
                anyhow::bail!("microphone capture requires a platform audio backend")
            }
            AudioInput::File(path) => Ok(Box::new(WavFileSource::new(path, config))),
            AudioInput::Tone { frequency_hz } => {
                Ok(Box::new(ToneSource::new(frequency_hz, config)))
            }
        }
    }
}

/// Streams a WAV file as live capture, paced at the block duration.
pub struct WavFileSource {
    path: PathBuf,
    config: AudioCaptureConfig,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl WavFileSource {
    pub fn new(path: PathBuf, config: AudioCaptureConfig) -> Self {
        Self {
            path,
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioCaptureSource for WavFileSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        let reader = hound::WavReader::open(&self.path)
            .with_context(|| format!("failed to open WAV file: {}", self.path.display()))?;

        let spec = reader.spec();
        if spec.sample_rate != self.config.sample_rate {
            anyhow::bail!(
                "expected {} Hz capture input, got {} Hz",
                self.config.sample_rate,
                spec.sample_rate
            );
        }
        if spec.channels != 1 {
            anyhow::bail!("expected mono capture input, got {} channels", spec.channels);
        }

        let samples: Vec<f32> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read audio samples")?
            .into_iter()
            .map(|s| s as f32 / 32768.0)
            .collect();

        info!(
            "WAV capture source ready: {} ({} samples at {} Hz)",
            self.path.display(),
            samples.len(),
            spec.sample_rate
        );

        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let sample_rate = self.config.sample_rate;
        let block_size = self.config.block_size;
        let (tx, rx) = mpsc::channel(16);

        self.task = Some(tokio::spawn(async move {
            let block_duration =
                std::time::Duration::from_secs_f64(block_size as f64 / sample_rate as f64);
            let mut offset = 0usize;

            while running.load(Ordering::SeqCst) && offset < samples.len() {
                let end = (offset + block_size).min(samples.len());
                let block = AudioBlock {
                    samples: samples[offset..end].to_vec(),
                    sample_rate,
                    timestamp_ms: (offset as u64 * 1000) / sample_rate as u64,
                };

                if tx.send(block).await.is_err() {
                    break;
                }

                offset = end;
                tokio::time::sleep(block_duration).await;
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "wav-file"
    }
}

/// Generates a continuous sine tone, paced at the block duration.
pub struct ToneSource {
    frequency_hz: f32,
    config: AudioCaptureConfig,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl ToneSource {
    pub fn new(frequency_hz: f32, config: AudioCaptureConfig) -> Self {
        Self {
            frequency_hz,
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioCaptureSource for ToneSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioBlock>> {
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let sample_rate = self.config.sample_rate;
        let block_size = self.config.block_size;
        let frequency = self.frequency_hz;
        let (tx, rx) = mpsc::channel(16);

        self.task = Some(tokio::spawn(async move {
            let block_duration =
                std::time::Duration::from_secs_f64(block_size as f64 / sample_rate as f64);
            let step = std::f32::consts::TAU * frequency / sample_rate as f32;
            let mut phase = 0.0f32;
            let mut produced = 0u64;

            while running.load(Ordering::SeqCst) {
                let samples: Vec<f32> = (0..block_size)
                    .map(|_| {
                        let s = phase.sin() * 0.5;
                        phase = (phase + step) % std::f32::consts::TAU;
                        s
                    })
                    .collect();

                let block = AudioBlock {
                    samples,
                    sample_rate,
                    timestamp_ms: (produced * 1000) / sample_rate as u64,
                };
                produced += block_size as u64;

                if tx.send(block).await.is_err() {
                    break;
                }

                tokio::time::sleep(block_duration).await;
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tone"
    }
}
