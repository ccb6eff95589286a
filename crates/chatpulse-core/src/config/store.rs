//! Realtime store configuration.

use serde::{Deserialize, Serialize};

/// Realtime store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider: `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Buffer size of each per-path change broadcast channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_channel_buffer() -> usize {
    256
}
