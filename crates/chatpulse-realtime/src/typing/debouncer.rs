//! Debounced typing flag for one actor in one conversation.

use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use chatpulse_core::traits::store::PresenceStore;
use chatpulse_core::types::id::{ActorId, ConversationId};

use crate::timer::Timer;

/// Default quiet period before a typing flag is cleared.
pub const DEFAULT_TYPING_TIMEOUT: Duration = Duration::from_millis(3000);

/// Local typing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingPhase {
    /// No typing burst in progress.
    Idle,
    /// A burst is in progress and `typing = true` has been emitted.
    Typing,
}

/// What the store is believed to hold for this actor's flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteFlag {
    /// Nothing written yet, or the last write failed.
    Unknown,
    Typing,
    Clear,
}

#[derive(Debug)]
struct DebounceState {
    phase: TypingPhase,
    last_keystroke_at: Option<Instant>,
    remote: RemoteFlag,
    timer: Option<Timer>,
    /// Bumped on every reschedule; a firing timeout with an older value is
    /// stale.
    epoch: u64,
    /// Set by `close`; activity is ignored from then on.
    closed: bool,
}

#[derive(Debug)]
struct Shared {
    conversation_id: ConversationId,
    actor_id: ActorId,
    store: Arc<dyn PresenceStore>,
    state: Mutex<DebounceState>,
}

impl Shared {
    /// Write the flag while the caller holds the state lock, so emissions
    /// reach the store in transition order.
    async fn emit(&self, state: &mut DebounceState, typing: bool) -> bool {
        match self
            .store
            .put_typing_flag(&self.conversation_id, &self.actor_id, typing)
            .await
        {
            Ok(()) => {
                state.remote = if typing {
                    RemoteFlag::Typing
                } else {
                    RemoteFlag::Clear
                };
                debug!(
                    conversation_id = %self.conversation_id,
                    actor_id = %self.actor_id,
                    typing,
                    "Typing flag emitted"
                );
                true
            }
            Err(e) => {
                state.remote = RemoteFlag::Unknown;
                warn!(
                    conversation_id = %self.conversation_id,
                    actor_id = %self.actor_id,
                    typing,
                    error = %e,
                    transient = e.is_transient(),
                    "Typing flag write failed"
                );
                false
            }
        }
    }

    /// Go idle, cancel the pending timeout and clear the remote flag
    /// unless it is already clear.
    async fn reset_locked(&self, state: &mut DebounceState) -> bool {
        if let Some(mut timer) = state.timer.take() {
            timer.cancel();
        }
        state.epoch += 1;
        state.last_keystroke_at = None;
        let was_typing = state.phase == TypingPhase::Typing;
        state.phase = TypingPhase::Idle;

        if !was_typing && state.remote == RemoteFlag::Clear {
            debug!(
                conversation_id = %self.conversation_id,
                actor_id = %self.actor_id,
                "Reset while idle, nothing to clear"
            );
            return false;
        }

        self.emit(state, false).await
    }
}

/// Turns raw input events into a debounced typing flag.
///
/// The first [`notify_activity`](Self::notify_activity) of a burst emits
/// `typing = true`; every activity reschedules a single quiet-period
/// timeout, and when it fires `typing = false` is emitted.
/// [`reset`](Self::reset) forces the idle state on send or teardown.
///
/// Dropping the debouncer cancels the pending timeout but writes nothing;
/// call `reset()` first to clear the remote flag.
#[derive(Debug)]
pub struct TypingDebouncer {
    shared: Arc<Shared>,
    timeout: Duration,
}

impl TypingDebouncer {
    /// Create an idle debouncer writing to `store`.
    pub fn new(
        store: Arc<dyn PresenceStore>,
        conversation_id: ConversationId,
        actor_id: ActorId,
        timeout: Duration,
    ) -> Self {
        Self::build(store, conversation_id, actor_id, timeout, false)
    }

    /// A debouncer that is closed from the start and never writes.
    pub(crate) fn closed(
        store: Arc<dyn PresenceStore>,
        conversation_id: ConversationId,
        actor_id: ActorId,
        timeout: Duration,
    ) -> Self {
        Self::build(store, conversation_id, actor_id, timeout, true)
    }

    fn build(
        store: Arc<dyn PresenceStore>,
        conversation_id: ConversationId,
        actor_id: ActorId,
        timeout: Duration,
        closed: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                conversation_id,
                actor_id,
                store,
                state: Mutex::new(DebounceState {
                    phase: TypingPhase::Idle,
                    last_keystroke_at: None,
                    remote: RemoteFlag::Unknown,
                    timer: None,
                    epoch: 0,
                    closed,
                }),
            }),
            timeout,
        }
    }

    /// Conversation this debouncer writes into.
    pub fn conversation_id(&self) -> &ConversationId {
        &self.shared.conversation_id
    }

    /// Actor whose flag this debouncer owns.
    pub fn actor_id(&self) -> &ActorId {
        &self.shared.actor_id
    }

    /// Quiet period.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current local phase.
    pub async fn phase(&self) -> TypingPhase {
        self.shared.state.lock().await.phase
    }

    /// Instant of the most recent activity in the current burst.
    pub async fn last_keystroke_at(&self) -> Option<Instant> {
        self.shared.state.lock().await.last_keystroke_at
    }

    /// Whether [`close`](Self::close) has been called.
    pub async fn is_closed(&self) -> bool {
        self.shared.state.lock().await.closed
    }

    /// Record one local input event. Ignored once closed.
    pub async fn notify_activity(&self) {
        let shared = &self.shared;
        let mut state = shared.state.lock().await;

        if state.closed {
            debug!(
                conversation_id = %shared.conversation_id,
                actor_id = %shared.actor_id,
                "Activity on closed debouncer ignored"
            );
            return;
        }

        state.last_keystroke_at = Some(Instant::now());
        state.epoch += 1;
        let epoch = state.epoch;
        // Replacing the old timer drops and thereby cancels it.
        state.timer = Some(Timer::after(
            self.timeout,
            expire(Arc::downgrade(shared), epoch),
        ));

        match (state.phase, state.remote) {
            (TypingPhase::Idle, _) => {
                state.phase = TypingPhase::Typing;
                shared.emit(&mut state, true).await;
            }
            (TypingPhase::Typing, RemoteFlag::Typing) => {}
            // The opening write of this burst failed.
            (TypingPhase::Typing, _) => {
                shared.emit(&mut state, true).await;
            }
        }
    }

    /// Force the idle state and clear the remote flag, cancelling any
    /// pending timeout.
    ///
    /// Emits `typing = false` unless the debouncer is idle and its last
    /// successful write already was `false`, so calling it twice in a row
    /// writes once. Returns whether a write succeeded.
    pub async fn reset(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        self.shared.reset_locked(&mut state).await
    }

    /// Reset, then seal the debouncer so later activity writes nothing.
    /// Used when the conversation view goes away while handles to this
    /// debouncer may still be alive.
    pub async fn close(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        state.closed = true;
        self.shared.reset_locked(&mut state).await
    }
}

/// Quiet-period timeout for the burst identified by `epoch`.
async fn expire(shared: Weak<Shared>, epoch: u64) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut state = shared.state.lock().await;
    if state.epoch != epoch || state.phase != TypingPhase::Typing {
        return;
    }

    state.phase = TypingPhase::Idle;
    state.last_keystroke_at = None;
    shared.emit(&mut state, false).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;
    use tokio::time;

    fn debouncer(store: &Arc<RecordingStore>) -> TypingDebouncer {
        TypingDebouncer::new(
            store.clone(),
            ConversationId::new("c1").unwrap(),
            ActorId::new("alice").unwrap(),
            DEFAULT_TYPING_TIMEOUT,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_activity_emits_true_then_false() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        assert_eq!(d.phase().await, TypingPhase::Typing);
        assert_eq!(store.typing_writes(), vec![true]);

        time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(store.typing_writes(), vec![true]);

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(store.typing_writes(), vec![true, false]);
        assert_eq!(d.phase().await, TypingPhase::Idle);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_emits_single_true_until_quiet() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        for _ in 0..10 {
            d.notify_activity().await;
            time::sleep(Duration::from_millis(1000)).await;
        }
        assert_eq!(store.typing_writes(), vec![true]);
        assert_eq!(d.phase().await, TypingPhase::Typing);

        time::sleep(Duration::from_millis(2001)).await;
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_burst_after_timeout_emits_again() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        time::sleep(Duration::from_secs(4)).await;
        d.notify_activity().await;
        time::sleep(Duration::from_secs(4)).await;

        assert_eq!(store.typing_writes(), vec![true, false, true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_and_cancels_timeout() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        assert!(d.reset().await);
        assert_eq!(d.phase().await, TypingPhase::Idle);
        assert_eq!(store.typing_writes(), vec![true, false]);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_reset_does_not_emit() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        assert!(d.reset().await);
        assert!(!d.reset().await);
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_reset_on_fresh_debouncer_clears_stale_flag() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        assert!(d.reset().await);
        assert!(!d.reset().await);
        assert_eq!(store.typing_writes(), vec![false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_after_timeout_is_noop() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        time::sleep(Duration::from_secs(5)).await;
        assert!(!d.reset().await);
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_true_is_retried_on_next_activity() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        store.set_failing(true);
        d.notify_activity().await;
        assert_eq!(d.phase().await, TypingPhase::Typing);
        assert!(store.typing_writes().is_empty());

        store.set_failing(false);
        d.notify_activity().await;
        d.notify_activity().await;
        assert_eq!(store.typing_writes(), vec![true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_false_is_retried_by_reset() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        store.set_failing(true);
        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(d.phase().await, TypingPhase::Idle);
        assert_eq!(store.typing_writes(), vec![true]);

        store.set_failing(false);
        assert!(d.reset().await);
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_clears_flag_and_ignores_later_activity() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        assert!(d.close().await);
        assert!(d.is_closed().await);

        d.notify_activity().await;
        assert_eq!(d.phase().await, TypingPhase::Idle);
        drop(d);
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.typing_writes(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timeout() {
        let store = Arc::new(RecordingStore::new());
        let d = debouncer(&store);

        d.notify_activity().await;
        drop(d);
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.typing_writes(), vec![true]);
    }
}
