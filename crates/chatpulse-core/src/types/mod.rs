//! Shared domain types used across all chatpulse crates.

pub mod change;
pub mod id;
pub mod presence;
pub mod typing;

pub use change::{StoreChange, StorePath};
pub use id::{ActorId, ConversationId, SessionId};
pub use presence::{PresenceRecord, PresenceUpdate};
pub use typing::{TypingFlag, TypingMap};
