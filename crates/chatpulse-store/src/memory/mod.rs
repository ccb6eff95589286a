//! In-memory realtime store.

pub mod bus;
pub mod store;

pub use bus::ChangeBus;
pub use store::MemoryPresenceStore;
