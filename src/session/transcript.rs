use chrono::Utc;

use crate::store::{Speaker, TranscriptEntry};

/// Merges streamed partial transcriptions into per-turn utterances.
///
/// Fragments arrive in delivery order and are concatenated, not replaced.
/// Live buffer contents are exposed for display only; entries exist once a
/// turn completes with non-empty text. Within one turn the user entry is
/// ordered before the model entry.
#[derive(Default)]
pub struct TranscriptAccumulator {
    input_buffer: String,
    output_buffer: String,
    history: Vec<TranscriptEntry>,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment of the user's speech transcription.
    pub fn push_input(&mut self, fragment: &str) {
        self.input_buffer.push_str(fragment);
    }

    /// Append a fragment of the model's speech transcription.
    pub fn push_output(&mut self, fragment: &str) {
        self.output_buffer.push_str(fragment);
    }

    /// What the user is currently saying (not yet finalized).
    pub fn live_input(&self) -> &str {
        &self.input_buffer
    }

    /// What the model is currently saying (not yet finalized).
    pub fn live_output(&self) -> &str {
        &self.output_buffer
    }

    /// Finalize the current turn: non-empty buffers become entries (user
    /// before model), both buffers are cleared. Returns the new entries.
    pub fn complete_turn(&mut self, session_id: &str) -> Vec<TranscriptEntry> {
        let mut entries = Vec::new();

        let input = std::mem::take(&mut self.input_buffer);
        if !input.is_empty() {
            entries.push(TranscriptEntry {
                id: format!("entry-{}", uuid::Uuid::new_v4()),
                session_id: session_id.to_string(),
                sender: Speaker::User,
                text: input,
                created_at: Utc::now(),
            });
        }

        let output = std::mem::take(&mut self.output_buffer);
        if !output.is_empty() {
            entries.push(TranscriptEntry {
                id: format!("entry-{}", uuid::Uuid::new_v4()),
                session_id: session_id.to_string(),
                sender: Speaker::Model,
                text: output,
                created_at: Utc::now(),
            });
        }

        self.history.extend(entries.iter().cloned());
        entries
    }

    /// Finalized entries, in creation order.
    pub fn history(&self) -> &[TranscriptEntry] {
        &self.history
    }

    /// Drop buffers and history (session teardown).
    pub fn clear(&mut self) {
        self.input_buffer.clear();
        self.output_buffer.clear();
        self.history.clear();
    }
}
