//! Presence store trait for the hosted realtime backend.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::result::AppResult;
use crate::types::change::{StoreChange, StorePath};
use crate::types::id::{ActorId, ConversationId};
use crate::types::presence::{PresenceRecord, PresenceUpdate};
use crate::types::typing::TypingMap;

/// Receiver side of a store subscription.
///
/// A lagging receiver loses the oldest changes; callers that need the
/// current value re-read it from the store.
pub type Subscription = broadcast::Receiver<StoreChange>;

/// Trait for realtime key-value backends holding presence records and
/// typing maps.
///
/// Writes are upserts with last-write-wins semantics and no transactional
/// guarantee. Implementations never serialize on behalf of callers:
/// timestamps stay opaque comparable values.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Upsert an actor's presence record.
    async fn put_presence(&self, actor_id: &ActorId, update: PresenceUpdate) -> AppResult<()>;

    /// Upsert one entry of a conversation's typing map.
    async fn put_typing_flag(
        &self,
        conversation_id: &ConversationId,
        actor_id: &ActorId,
        typing: bool,
    ) -> AppResult<()>;

    /// Read an actor's presence record, `None` if the actor never signed in.
    async fn get_presence(&self, actor_id: &ActorId) -> AppResult<Option<PresenceRecord>>;

    /// Read a conversation's typing map. Unknown conversations yield an
    /// empty map.
    async fn typing_flags(&self, conversation_id: &ConversationId) -> AppResult<TypingMap>;

    /// Subscribe to changes at `path`.
    async fn subscribe(&self, path: &StorePath) -> AppResult<Subscription>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
