//! Subscription paths and change notifications of the realtime store.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{ActorId, ConversationId};
use super::presence::PresenceRecord;
use super::typing::TypingFlag;

/// A location in the realtime store that can be subscribed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorePath {
    /// One actor's presence record.
    Presence {
        /// Watched actor.
        actor_id: ActorId,
    },
    /// The typing map of one conversation.
    Typing {
        /// Watched conversation.
        conversation_id: ConversationId,
    },
}

impl StorePath {
    /// Path of an actor's presence record.
    pub fn presence(actor_id: ActorId) -> Self {
        Self::Presence { actor_id }
    }

    /// Path of a conversation's typing map.
    pub fn typing(conversation_id: ConversationId) -> Self {
        Self::Typing { conversation_id }
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence { actor_id } => write!(f, "presence/{actor_id}"),
            Self::Typing { conversation_id } => write!(f, "typing/{conversation_id}"),
        }
    }
}

/// A change pushed to subscribers of a [`StorePath`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreChange {
    /// A presence record was upserted; carries the record after the write.
    Presence(PresenceRecord),
    /// A typing flag was upserted.
    Typing(TypingFlag),
}

impl StoreChange {
    /// The path this change was published on.
    pub fn path(&self) -> StorePath {
        match self {
            Self::Presence(record) => StorePath::presence(record.actor_id.clone()),
            Self::Typing(flag) => StorePath::typing(flag.conversation_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let actor = ActorId::new("alice").unwrap();
        let conv = ConversationId::new("c1").unwrap();
        assert_eq!(StorePath::presence(actor).to_string(), "presence/alice");
        assert_eq!(StorePath::typing(conv).to_string(), "typing/c1");
    }

    #[test]
    fn test_change_reports_its_path() {
        let flag = TypingFlag {
            conversation_id: ConversationId::new("c1").unwrap(),
            actor_id: ActorId::new("bob").unwrap(),
            typing: true,
        };
        let change = StoreChange::Typing(flag);
        assert_eq!(
            change.path(),
            StorePath::typing(ConversationId::new("c1").unwrap())
        );
    }
}
