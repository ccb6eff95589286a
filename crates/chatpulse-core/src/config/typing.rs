//! Typing indicator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Typing indicator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Quiet period after the last keystroke before typing is cleared.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Label shown for a typing actor whose display name is unknown.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

impl TypingConfig {
    /// Quiet period as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            fallback_label: default_fallback_label(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_fallback_label() -> String {
    "Someone".to_string()
}
