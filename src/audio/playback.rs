//! Gapless playback scheduling for streamed model speech.
//!
//! Chunks arrive with arbitrary inter-arrival jitter; the scheduler keeps a
//! monotonically advancing next-start cursor so consecutive chunks play
//! back-to-back with no gap and no overlap. An interruption signal stops
//! every in-flight voice and resets the cursor, so the next chunk starts
//! immediately instead of honoring stale scheduling.

use anyhow::Result;

use super::encode::DecodedAudio;

/// Output-side audio device. Implementations own the output clock and the
/// actual voice playback; the scheduler only decides start times.
pub trait PlaybackSink: Send + Sync {
    /// Current position of the output clock, in seconds.
    fn now(&self) -> f64;

    /// Begin playing `audio` at `start_time` on the output clock.
    fn start_voice(&self, audio: DecodedAudio, start_time: f64) -> Result<Box<dyn PlaybackVoice>>;
}

/// Handle to one scheduled voice. Dropping a handle must not stop playback;
/// only an explicit `stop` does.
pub trait PlaybackVoice: Send {
    fn stop(&mut self);
}

struct ActiveVoice {
    end_time: f64,
    voice: Box<dyn PlaybackVoice>,
}

pub struct PlaybackScheduler {
    sink: std::sync::Arc<dyn PlaybackSink>,
    next_start_time: f64,
    voices: Vec<ActiveVoice>,
}

impl PlaybackScheduler {
    pub fn new(sink: std::sync::Arc<dyn PlaybackSink>) -> Self {
        Self {
            sink,
            next_start_time: 0.0,
            voices: Vec::new(),
        }
    }

    /// Schedule one decoded chunk; returns its start time on the output clock.
    pub fn enqueue(&mut self, audio: DecodedAudio) -> Result<f64> {
        self.reap_finished();

        let start_time = self.next_start_time.max(self.sink.now());
        let duration = audio.duration_secs();
        let voice = self.sink.start_voice(audio, start_time)?;

        self.next_start_time = start_time + duration;
        self.voices.push(ActiveVoice {
            end_time: self.next_start_time,
            voice,
        });

        Ok(start_time)
    }

    /// Stop every in-flight voice and reset the cursor to zero.
    pub fn interrupt(&mut self) {
        for active in &mut self.voices {
            active.voice.stop();
        }
        self.voices.clear();
        self.next_start_time = 0.0;
    }

    /// Drop handles whose scheduled window has passed on the output clock.
    pub fn reap_finished(&mut self) {
        let now = self.sink.now();
        self.voices.retain(|active| active.end_time > now);
    }

    pub fn in_flight(&self) -> usize {
        self.voices.len()
    }

    pub fn cursor(&self) -> f64 {
        self.next_start_time
    }
}
