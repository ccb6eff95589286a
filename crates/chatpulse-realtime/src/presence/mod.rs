//! Actor presence: resolution for display and store-backed lookups.

pub mod display;
pub mod monitor;
pub mod resolver;

pub use display::DisplayState;
pub use monitor::PresenceMonitor;
pub use resolver::{DEFAULT_ONLINE_GRACE, PresenceResolver, resolve};
