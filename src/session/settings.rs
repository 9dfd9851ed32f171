use serde::{Deserialize, Serialize};

/// Per-session user settings, supplied at start and immutable while the
/// session is active; changes require stop/restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub camera_enabled: bool,
    pub mic_enabled: bool,
    pub voice_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            camera_enabled: true,
            mic_enabled: true,
            voice_name: "Zephyr".to_string(),
        }
    }
}
