//! # chatpulse-realtime
//!
//! Presence and typing engine for chatpulse. Provides:
//!
//! - Owned, cancelable timers
//! - Online heartbeats with a single, race-safe offline signal
//! - Debounced typing flags per conversation
//! - Presence resolution into display states ("last seen 5 minutes ago")
//! - "Who is typing" aggregation
//! - Per-actor chat sessions tying the above to sign-in, send, close,
//!   sign-out and unload

pub mod heartbeat;
pub mod presence;
pub mod session;
pub mod timer;
pub mod typing;

#[cfg(test)]
mod testing;

pub use heartbeat::{HeartbeatPublisher, StopOutcome};
pub use presence::{DisplayState, PresenceMonitor, PresenceResolver};
pub use session::{ChatSession, SessionOptions};
pub use timer::Timer;
pub use typing::{TypingAggregator, TypingDebouncer, TypingPhase};
