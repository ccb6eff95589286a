//! # chatpulse-store
//!
//! Presence store providers for chatpulse. The hosted realtime database
//! is reached through [`PresenceStore`](chatpulse_core::traits::PresenceStore);
//! this crate ships:
//!
//! - **memory**: an in-process store with per-path broadcast subscriptions,
//!   used by the agent, the CLI simulator and tests
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

#[cfg(feature = "memory")]
pub use memory::MemoryPresenceStore;
pub use provider::StoreManager;
