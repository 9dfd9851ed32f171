//! Camera frame capture and JPEG compression for the video pump.
//!
//! The live feed hardware sits behind `VideoCaptureSource`; the pump asks for
//! one frame per tick and only the most recently requested capture matters.

use anyhow::{Context, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::io::Cursor;

use crate::transport::MediaPayload;

/// Video capture source trait
#[async_trait::async_trait]
pub trait VideoCaptureSource: Send {
    /// Acquire the device.
    async fn open(&mut self) -> Result<()>;

    /// Grab the current frame from the live feed.
    async fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Release the device.
    async fn close(&mut self) -> Result<()>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// Video input selector
#[derive(Debug, Clone)]
pub enum VideoInput {
    /// Live camera (requires a platform camera backend)
    Camera,
    /// Generated test pattern (demos, wiring checks)
    TestPattern { width: u32, height: u32 },
}

pub struct VideoSourceFactory;

impl VideoSourceFactory {
    pub fn create(input: VideoInput) -> Result<Box<dyn VideoCaptureSource>> {
        match input {
            VideoInput::Camera => {
                anyhow::bail!("camera capture requires a platform video backend")
            }
            VideoInput::TestPattern { width, height } => {
                Ok(Box::new(TestPatternSource::new(width, height)))
            }
        }
    }
}

/// Compress one frame to JPEG and wrap it as a wire payload.
pub fn jpeg_payload(frame: &RgbImage, quality: u8) -> Result<MediaPayload> {
    let mut bytes = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .encode_image(frame)
        .context("failed to compress video frame")?;

    Ok(MediaPayload {
        mime_type: "image/jpeg".to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(bytes.into_inner()),
    })
}

/// Renders a moving gradient, one distinct frame per capture.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    frame_number: u32,
    open: bool,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_number: 0,
            open: false,
        }
    }
}

#[async_trait::async_trait]
impl VideoCaptureSource for TestPatternSource {
    async fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    async fn capture_frame(&mut self) -> Result<RgbImage> {
        if !self.open {
            anyhow::bail!("test pattern source is not open");
        }

        let n = self.frame_number;
        self.frame_number += 1;

        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb([
                (x % 256) as u8,
                (y % 256) as u8,
                ((x + y + n * 8) % 256) as u8,
            ])
        }))
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn name(&self) -> &str {
        "test-pattern"
    }
}
