//! One signed-in actor's presence and typing session.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use chatpulse_core::config::AppConfig;
use chatpulse_core::traits::store::PresenceStore;
use chatpulse_core::types::id::{ActorId, ConversationId, SessionId};

use crate::heartbeat::{HeartbeatPublisher, StopOutcome};
use crate::typing::{DEFAULT_TYPING_TIMEOUT, TypingDebouncer};

/// Timing knobs of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Interval between online heartbeats.
    pub heartbeat_interval: Duration,
    /// Typing quiet period.
    pub typing_timeout: Duration,
}

impl SessionOptions {
    /// Options from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            heartbeat_interval: config.presence.heartbeat_interval(),
            typing_timeout: config.typing.timeout(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(25),
            typing_timeout: DEFAULT_TYPING_TIMEOUT,
        }
    }
}

/// Why a session is being ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The actor signed out explicitly.
    SignOut,
    /// The page or app is being unloaded.
    Unload,
}

/// The presence writer and typing writers of one local session.
///
/// The session is the only writer of its actor's presence record and
/// typing flags. Several sessions of the same actor (tabs, devices) race
/// on the store with last-write-wins and are not arbitrated here.
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    actor_id: ActorId,
    store: Arc<dyn PresenceStore>,
    options: SessionOptions,
    heartbeat: HeartbeatPublisher,
    conversations: Mutex<HashMap<ConversationId, Arc<TypingDebouncer>>>,
    ended: AtomicBool,
}

impl ChatSession {
    /// Sign in: start the heartbeat for `actor_id`.
    pub fn start(store: Arc<dyn PresenceStore>, actor_id: ActorId, options: SessionOptions) -> Self {
        let id = SessionId::new();
        info!(session_id = %id, actor_id = %actor_id, "Chat session started");
        let heartbeat =
            HeartbeatPublisher::start(Arc::clone(&store), actor_id.clone(), options.heartbeat_interval);

        Self {
            id,
            actor_id,
            store,
            options,
            heartbeat,
            conversations: Mutex::new(HashMap::new()),
            ended: AtomicBool::new(false),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Signed-in actor.
    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    /// Heartbeat publisher of this session.
    pub fn heartbeat(&self) -> &HeartbeatPublisher {
        &self.heartbeat
    }

    /// Whether sign-out or unload has begun.
    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    /// Open a conversation view, returning its debouncer. Opening an
    /// already open conversation returns the existing one. After the
    /// session has ended the returned debouncer is closed and not tracked.
    pub async fn open_conversation(&self, conversation_id: &ConversationId) -> Arc<TypingDebouncer> {
        let mut conversations = self.conversations.lock().await;
        if self.is_ended() {
            return Arc::new(TypingDebouncer::closed(
                Arc::clone(&self.store),
                conversation_id.clone(),
                self.actor_id.clone(),
                self.options.typing_timeout,
            ));
        }
        Arc::clone(
            conversations
                .entry(conversation_id.clone())
                .or_insert_with(|| {
                    debug!(
                        session_id = %self.id,
                        conversation_id = %conversation_id,
                        "Conversation opened"
                    );
                    Arc::new(TypingDebouncer::new(
                        Arc::clone(&self.store),
                        conversation_id.clone(),
                        self.actor_id.clone(),
                        self.options.typing_timeout,
                    ))
                }),
        )
    }

    /// Conversations currently open.
    pub async fn open_conversations(&self) -> Vec<ConversationId> {
        let mut ids: Vec<_> = self.conversations.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Forward one local input event in `conversation_id`. Ignored after
    /// the session has ended.
    pub async fn notify_typing(&self, conversation_id: &ConversationId) {
        if self.is_ended() {
            debug!(session_id = %self.id, "Typing after session end ignored");
            return;
        }
        let debouncer = self.open_conversation(conversation_id).await;
        debouncer.notify_activity().await;
    }

    /// A message was sent in `conversation_id`: clear the typing flag.
    pub async fn message_sent(&self, conversation_id: &ConversationId) {
        let debouncer = self.conversations.lock().await.get(conversation_id).cloned();
        if let Some(debouncer) = debouncer {
            debouncer.reset().await;
        }
    }

    /// Close a conversation view: clear its typing flag and drop its
    /// debouncer. Returns `false` if it was not open.
    pub async fn close_conversation(&self, conversation_id: &ConversationId) -> bool {
        let removed = self.conversations.lock().await.remove(conversation_id);
        match removed {
            Some(debouncer) => {
                debouncer.close().await;
                debug!(
                    session_id = %self.id,
                    conversation_id = %conversation_id,
                    "Conversation closed"
                );
                true
            }
            None => false,
        }
    }

    /// Explicit sign-out.
    pub async fn sign_out(&self) -> StopOutcome {
        self.end(EndReason::SignOut).await
    }

    /// Page/app unload. Safe to race with [`sign_out`](Self::sign_out).
    pub async fn on_unload(&self) -> StopOutcome {
        self.end(EndReason::Unload).await
    }

    /// Clear every typing flag, then write offline once.
    pub async fn end(&self, reason: EndReason) -> StopOutcome {
        self.ended.store(true, Ordering::SeqCst);

        let debouncers: Vec<_> = self
            .conversations
            .lock()
            .await
            .drain()
            .map(|(_, d)| d)
            .collect();
        futures::future::join_all(debouncers.iter().map(|d| d.close())).await;

        let outcome = self.heartbeat.stop().await;
        info!(
            session_id = %self.id,
            actor_id = %self.actor_id,
            reason = ?reason,
            outcome = ?outcome,
            "Chat session ended"
        );
        outcome
    }
}
