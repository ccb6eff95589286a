//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use chatpulse_core::config::AppConfig;
use chatpulse_core::error::AppError;
use chatpulse_core::result::AppResult;
use chatpulse_core::traits::store::{PresenceStore, Subscription};
use chatpulse_core::types::change::StorePath;
use chatpulse_core::types::id::{ActorId, ConversationId};
use chatpulse_core::types::presence::{PresenceRecord, PresenceUpdate};
use chatpulse_core::types::typing::TypingMap;
use chatpulse_realtime::{ChatSession, SessionOptions};
use chatpulse_store::MemoryPresenceStore;

/// Shared memory store plus the writes that reached it.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryPresenceStore,
    presence_log: Mutex<Vec<(ActorId, bool)>>,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent operation fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful presence writes for `actor`, as online flags in order.
    pub fn presence_log(&self, actor: &ActorId) -> Vec<bool> {
        self.presence_log
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| a == actor)
            .map(|(_, online)| *online)
            .collect()
    }

    fn check(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for FlakyStore {
    async fn put_presence(&self, actor_id: &ActorId, update: PresenceUpdate) -> AppResult<()> {
        self.check()?;
        self.inner.put_presence(actor_id, update).await?;
        self.presence_log
            .lock()
            .unwrap()
            .push((actor_id.clone(), update.online));
        Ok(())
    }

    async fn put_typing_flag(
        &self,
        conversation_id: &ConversationId,
        actor_id: &ActorId,
        typing: bool,
    ) -> AppResult<()> {
        self.check()?;
        self.inner
            .put_typing_flag(conversation_id, actor_id, typing)
            .await
    }

    async fn get_presence(&self, actor_id: &ActorId) -> AppResult<Option<PresenceRecord>> {
        self.check()?;
        self.inner.get_presence(actor_id).await
    }

    async fn typing_flags(&self, conversation_id: &ConversationId) -> AppResult<TypingMap> {
        self.check()?;
        self.inner.typing_flags(conversation_id).await
    }

    async fn subscribe(&self, path: &StorePath) -> AppResult<Subscription> {
        self.inner.subscribe(path).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.failing.load(Ordering::SeqCst))
    }
}

pub fn actor(id: &str) -> ActorId {
    ActorId::new(id).unwrap()
}

pub fn conversation(id: &str) -> ConversationId {
    ConversationId::new(id).unwrap()
}

/// Session options from the default configuration.
pub fn default_options() -> SessionOptions {
    SessionOptions::from_config(&AppConfig::default())
}

pub fn sign_in(store: &Arc<FlakyStore>, id: &str) -> ChatSession {
    ChatSession::start(store.clone(), actor(id), default_options())
}

/// Let spawned timer tasks run under a paused clock.
pub async fn settle() {
    time::sleep(Duration::from_millis(1)).await;
}
