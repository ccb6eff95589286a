//! Typing flags as stored in the realtime store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::{ActorId, ConversationId};

/// Per-conversation mapping of actor → typing flag.
///
/// A `BTreeMap` keeps iteration order stable for a fixed set of keys.
pub type TypingMap = BTreeMap<ActorId, bool>;

/// A single typing flag entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingFlag {
    /// Conversation the flag belongs to.
    pub conversation_id: ConversationId,
    /// Actor that owns the flag.
    pub actor_id: ActorId,
    /// Whether the actor is currently typing.
    pub typing: bool,
}
