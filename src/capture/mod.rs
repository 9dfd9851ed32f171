//! Capture pumps: two independent periodic producers feeding the transport.
//!
//! The audio pump drains fixed-size blocks from the capture source; the video
//! pump grabs one frame per timer tick. Neither waits for acknowledgement: a
//! failed send is logged and the next block/frame goes out regardless. Both
//! stop promptly when the session's running flag drops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::audio::encode;
use crate::audio::source::AudioBlock;
use crate::transport::LiveTransport;
use crate::video::{self, VideoCaptureSource};

/// Spawn the audio block pump.
///
/// Blocks are dropped (not buffered) while the microphone is disabled.
pub fn spawn_audio_pump(
    mut blocks: mpsc::Receiver<AudioBlock>,
    transport: Arc<dyn LiveTransport>,
    mic_enabled: bool,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Audio pump started (mic_enabled={})", mic_enabled);

        while let Some(block) = blocks.recv().await {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            if !mic_enabled {
                continue;
            }

            let payload = encode::pcm_payload(&block.samples, block.sample_rate);
            if let Err(e) = transport.send_media(payload).await {
                error!("Failed to send audio block: {:#}", e);
            }
        }

        info!("Audio pump stopped");
    })
}

/// Spawn the video frame pump at a fixed frame rate.
///
/// The camera handle is shared so the controller can release the device even
/// while a tick is mid-capture. No frame queue is kept; a tick that falls
/// behind is skipped.
pub fn spawn_video_pump(
    camera: Arc<Mutex<Box<dyn VideoCaptureSource>>>,
    transport: Arc<dyn LiveTransport>,
    frame_rate: f64,
    jpeg_quality: u8,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Video pump started ({} fps)", frame_rate);

        let period = std::time::Duration::from_secs_f64(1.0 / frame_rate.max(0.001));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately.
        ticker.tick().await;

        while running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }

            let frame = {
                let mut camera = camera.lock().await;
                camera.capture_frame().await
            };

            match frame {
                Ok(frame) => match video::jpeg_payload(&frame, jpeg_quality) {
                    Ok(payload) => {
                        if let Err(e) = transport.send_media(payload).await {
                            error!("Failed to send video frame: {:#}", e);
                        }
                    }
                    Err(e) => warn!("Failed to compress video frame: {:#}", e),
                },
                Err(e) => warn!("Failed to capture video frame: {:#}", e),
            }
        }

        info!("Video pump stopped");
    })
}
