//! In-memory presence store using dashmap.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use chatpulse_core::config::store::StoreConfig;
use chatpulse_core::result::AppResult;
use chatpulse_core::traits::store::{PresenceStore, Subscription};
use chatpulse_core::types::change::{StoreChange, StorePath};
use chatpulse_core::types::id::{ActorId, ConversationId};
use chatpulse_core::types::presence::{PresenceRecord, PresenceUpdate};
use chatpulse_core::types::typing::{TypingFlag, TypingMap};

use super::bus::ChangeBus;

/// In-memory presence store.
///
/// Every write is applied last-write-wins and then published to the
/// subscribers of the written path.
#[derive(Debug, Clone)]
pub struct MemoryPresenceStore {
    /// Actor ID → presence record
    presence: Arc<DashMap<ActorId, PresenceRecord>>,
    /// Conversation ID → typing map
    typing: Arc<DashMap<ConversationId, TypingMap>>,
    /// Change fan-out
    bus: Arc<ChangeBus>,
}

impl MemoryPresenceStore {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_buffer(config.channel_buffer_size)
    }

    /// Create a new in-memory store with an explicit channel buffer size.
    pub fn with_buffer(buffer_size: usize) -> Self {
        Self {
            presence: Arc::new(DashMap::new()),
            typing: Arc::new(DashMap::new()),
            bus: Arc::new(ChangeBus::new(buffer_size)),
        }
    }

    /// Number of presence records held.
    pub fn presence_count(&self) -> usize {
        self.presence.len()
    }

    /// The change bus backing subscriptions.
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}

impl Default for MemoryPresenceStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn put_presence(&self, actor_id: &ActorId, update: PresenceUpdate) -> AppResult<()> {
        let record = {
            let mut entry = self
                .presence
                .entry(actor_id.clone())
                .or_insert_with(|| PresenceRecord::unseen(actor_id.clone()));
            entry.apply(update);
            entry.value().clone()
        };

        let notified = self.bus.publish(StoreChange::Presence(record));
        debug!(
            actor_id = %actor_id,
            online = update.online,
            notified,
            "Presence written"
        );
        Ok(())
    }

    async fn put_typing_flag(
        &self,
        conversation_id: &ConversationId,
        actor_id: &ActorId,
        typing: bool,
    ) -> AppResult<()> {
        self.typing
            .entry(conversation_id.clone())
            .or_default()
            .insert(actor_id.clone(), typing);

        let notified = self.bus.publish(StoreChange::Typing(TypingFlag {
            conversation_id: conversation_id.clone(),
            actor_id: actor_id.clone(),
            typing,
        }));
        debug!(
            conversation_id = %conversation_id,
            actor_id = %actor_id,
            typing,
            notified,
            "Typing flag written"
        );
        Ok(())
    }

    async fn get_presence(&self, actor_id: &ActorId) -> AppResult<Option<PresenceRecord>> {
        Ok(self.presence.get(actor_id).map(|r| r.value().clone()))
    }

    async fn typing_flags(&self, conversation_id: &ConversationId) -> AppResult<TypingMap> {
        Ok(self
            .typing
            .get(conversation_id)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }

    async fn subscribe(&self, path: &StorePath) -> AppResult<Subscription> {
        debug!(path = %path, "Subscribing");
        Ok(self.bus.subscribe(path))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
