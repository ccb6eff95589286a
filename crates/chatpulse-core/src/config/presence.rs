//! Heartbeat and presence resolution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Interval between online heartbeats, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// How long after the last heartbeat an offline actor is still shown as
    /// online, in seconds.
    #[serde(default = "default_online_grace")]
    pub online_grace_seconds: u64,
    /// Maximum number of actors whose last resolved state is retained.
    #[serde(default = "default_monitor_capacity")]
    pub monitor_cache_capacity: u64,
}

impl PresenceConfig {
    /// Heartbeat interval as a [`Duration`].
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds)
    }

    /// Online grace window as a [`Duration`].
    pub fn online_grace(&self) -> Duration {
        Duration::from_secs(self.online_grace_seconds)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            online_grace_seconds: default_online_grace(),
            monitor_cache_capacity: default_monitor_capacity(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    25
}

fn default_online_grace() -> u64 {
    30
}

fn default_monitor_capacity() -> u64 {
    10_000
}
