//! Core traits defined in `chatpulse-core` and implemented by other crates.

pub mod store;

pub use store::{PresenceStore, Subscription};
