//! Live session management
//!
//! This module provides the `LiveSessionController` abstraction that manages:
//! - Session lifecycle (idle/connecting/active/error)
//! - Capture device acquisition and the audio/video pumps
//! - Inbound event dispatch (transcriptions, audio chunks, turn signals)
//! - Gapless playback scheduling and interruption
//! - Transcript finalization and best-effort persistence

mod controller;
mod devices;
mod settings;
mod transcript;

pub use controller::{
    classify_failure, ControllerConfig, FailureKind, LiveSessionController, SessionStatus,
};
pub use devices::{FactoryDevices, MediaDeviceProvider};
pub use settings::SessionSettings;
pub use transcript::TranscriptAccumulator;
