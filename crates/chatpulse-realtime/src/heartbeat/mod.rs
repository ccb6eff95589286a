//! Online heartbeats for the local actor.

pub mod publisher;

pub use publisher::{
    HeartbeatPhase, HeartbeatPublisher, HeartbeatStats, MIN_HEARTBEAT_INTERVAL, StopOutcome,
};
