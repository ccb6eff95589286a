//! Test doubles shared by the unit tests of this crate.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use chatpulse_core::error::AppError;
use chatpulse_core::result::AppResult;
use chatpulse_core::traits::store::{PresenceStore, Subscription};
use chatpulse_core::types::change::StorePath;
use chatpulse_core::types::id::{ActorId, ConversationId};
use chatpulse_core::types::presence::{PresenceRecord, PresenceUpdate};
use chatpulse_core::types::typing::TypingMap;
use chatpulse_store::MemoryPresenceStore;

/// A successful write seen by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Presence(ActorId, PresenceUpdate),
    Typing(ConversationId, ActorId, bool),
}

/// Memory store that records every successful write in order and can be
/// switched into a failing mode.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryPresenceStore,
    writes: Mutex<Vec<Write>>,
    failing_writes: AtomicBool,
    failing_reads: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn presence_writes(&self) -> Vec<(ActorId, PresenceUpdate)> {
        self.writes()
            .into_iter()
            .filter_map(|w| match w {
                Write::Presence(actor, update) => Some((actor, update)),
                Write::Typing(..) => None,
            })
            .collect()
    }

    pub fn typing_writes(&self) -> Vec<bool> {
        self.writes()
            .into_iter()
            .filter_map(|w| match w {
                Write::Typing(_, _, typing) => Some(typing),
                Write::Presence(..) => None,
            })
            .collect()
    }

    fn check_writes(&self) -> AppResult<()> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(AppError::write_failure("injected write failure"));
        }
        Ok(())
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(AppError::read_failure("injected read failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for RecordingStore {
    async fn put_presence(&self, actor_id: &ActorId, update: PresenceUpdate) -> AppResult<()> {
        self.check_writes()?;
        self.inner.put_presence(actor_id, update).await?;
        self.writes
            .lock()
            .unwrap()
            .push(Write::Presence(actor_id.clone(), update));
        Ok(())
    }

    async fn put_typing_flag(
        &self,
        conversation_id: &ConversationId,
        actor_id: &ActorId,
        typing: bool,
    ) -> AppResult<()> {
        self.check_writes()?;
        self.inner
            .put_typing_flag(conversation_id, actor_id, typing)
            .await?;
        self.writes.lock().unwrap().push(Write::Typing(
            conversation_id.clone(),
            actor_id.clone(),
            typing,
        ));
        Ok(())
    }

    async fn get_presence(&self, actor_id: &ActorId) -> AppResult<Option<PresenceRecord>> {
        self.check_reads()?;
        self.inner.get_presence(actor_id).await
    }

    async fn typing_flags(&self, conversation_id: &ConversationId) -> AppResult<TypingMap> {
        self.check_reads()?;
        self.inner.typing_flags(conversation_id).await
    }

    async fn subscribe(&self, path: &StorePath) -> AppResult<Subscription> {
        self.inner.subscribe(path).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.failing_reads.load(Ordering::SeqCst))
    }
}
