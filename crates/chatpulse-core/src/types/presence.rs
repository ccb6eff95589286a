//! Presence records as stored in the realtime store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ActorId;

/// The value written by a presence upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    /// Whether the actor declares itself online.
    pub online: bool,
    /// When the write was produced.
    pub last_seen: DateTime<Utc>,
}

impl PresenceUpdate {
    /// An "I am online" heartbeat stamped at `now`.
    pub fn online_at(now: DateTime<Utc>) -> Self {
        Self {
            online: true,
            last_seen: now,
        }
    }

    /// An "I am offline" signal stamped at `now`.
    pub fn offline_at(now: DateTime<Utc>) -> Self {
        Self {
            online: false,
            last_seen: now,
        }
    }
}

/// One actor's presence record.
///
/// Created on first sign-in and never deleted. `last_seen` is `None` for an
/// actor whose record exists but has never been stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// Owner of the record.
    pub actor_id: ActorId,
    /// Explicit online flag.
    pub online: bool,
    /// Last heartbeat or sign-out timestamp.
    pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceRecord {
    /// A record for an actor that has never been seen.
    pub fn unseen(actor_id: ActorId) -> Self {
        Self {
            actor_id,
            online: false,
            last_seen: None,
        }
    }

    /// Apply an upsert to this record (last write wins).
    pub fn apply(&mut self, update: PresenceUpdate) {
        self.online = update.online;
        self.last_seen = Some(update.last_seen);
    }
}
