//! Periodic "I am online" heartbeat with a single final offline signal.

use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use chatpulse_core::traits::store::PresenceStore;
use chatpulse_core::types::id::ActorId;
use chatpulse_core::types::presence::PresenceUpdate;

use crate::timer::Timer;

/// Lifecycle of a heartbeat publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatPhase {
    /// Ticks are being written.
    Running,
    /// The interval is cancelled but the offline write has not succeeded yet.
    Stopping,
    /// The offline signal was written; every further `stop()` is a no-op.
    Stopped,
}

/// Result of a [`HeartbeatPublisher::stop`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// This call wrote the offline signal.
    Stopped,
    /// An earlier call already wrote the offline signal.
    AlreadyStopped,
    /// The offline write failed; a later `stop()` will retry it.
    WriteFailed,
}

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatStats {
    /// Successful online writes.
    pub beats: u64,
    /// Failed online writes.
    pub failed_beats: u64,
}

#[derive(Debug)]
struct PublisherState {
    phase: HeartbeatPhase,
    stats: HeartbeatStats,
}

#[derive(Debug)]
struct Shared {
    actor_id: ActorId,
    store: Arc<dyn PresenceStore>,
    state: Mutex<PublisherState>,
}

/// Shortest interval a publisher ticks at.
pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Writes `{online: true, last_seen: now}` for one actor immediately and
/// every interval, and `{online: false, last_seen: now}` exactly once on
/// [`stop`](Self::stop).
///
/// Ticks and the offline write are serialized on the same lock, so a tick
/// in flight always lands before the offline signal. Dropping the publisher
/// cancels the interval without writing offline.
#[derive(Debug)]
pub struct HeartbeatPublisher {
    shared: Arc<Shared>,
    timer: StdMutex<Option<Timer>>,
    interval: Duration,
}

impl HeartbeatPublisher {
    /// Start publishing heartbeats for `actor_id` every `interval`.
    ///
    /// Must be called within a tokio runtime. A zero `interval` is raised to
    /// [`MIN_HEARTBEAT_INTERVAL`].
    pub fn start(store: Arc<dyn PresenceStore>, actor_id: ActorId, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                actor_id = %actor_id,
                min_ms = MIN_HEARTBEAT_INTERVAL.as_millis() as u64,
                "Zero heartbeat interval, using minimum"
            );
            MIN_HEARTBEAT_INTERVAL
        } else {
            interval
        };

        let shared = Arc::new(Shared {
            actor_id,
            store,
            state: Mutex::new(PublisherState {
                phase: HeartbeatPhase::Running,
                stats: HeartbeatStats::default(),
            }),
        });

        let weak = Arc::downgrade(&shared);
        let timer = Timer::every(interval, move || beat(weak.clone()));

        info!(
            actor_id = %shared.actor_id,
            interval_ms = interval.as_millis() as u64,
            "Heartbeat started"
        );

        Self {
            shared,
            timer: StdMutex::new(Some(timer)),
            interval,
        }
    }

    /// Actor this publisher writes for.
    pub fn actor_id(&self) -> &ActorId {
        &self.shared.actor_id
    }

    /// Configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> HeartbeatPhase {
        self.shared.state.lock().await.phase
    }

    /// Whether ticks are still being written.
    pub async fn is_running(&self) -> bool {
        self.phase().await == HeartbeatPhase::Running
    }

    /// Snapshot of the write counters.
    pub async fn stats(&self) -> HeartbeatStats {
        self.shared.state.lock().await.stats
    }

    /// Cancel the interval and write the offline signal.
    ///
    /// Safe to call from several triggers at once (sign-out, page unload,
    /// teardown): exactly one call writes offline, the rest return
    /// [`StopOutcome::AlreadyStopped`].
    pub async fn stop(&self) -> StopOutcome {
        let shared = &self.shared;
        let mut state = shared.state.lock().await;

        if state.phase == HeartbeatPhase::Stopped {
            debug!(actor_id = %shared.actor_id, "Heartbeat already stopped");
            return StopOutcome::AlreadyStopped;
        }

        self.cancel_timer();
        state.phase = HeartbeatPhase::Stopping;

        match shared
            .store
            .put_presence(&shared.actor_id, PresenceUpdate::offline_at(Utc::now()))
            .await
        {
            Ok(()) => {
                state.phase = HeartbeatPhase::Stopped;
                info!(actor_id = %shared.actor_id, "Heartbeat stopped, offline written");
                StopOutcome::Stopped
            }
            Err(e) => {
                warn!(
                    actor_id = %shared.actor_id,
                    error = %e,
                    transient = e.is_transient(),
                    "Offline write failed, will retry on next stop"
                );
                StopOutcome::WriteFailed
            }
        }
    }

    fn cancel_timer(&self) {
        let taken = match self.timer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(mut timer) = taken {
            timer.cancel();
        }
    }
}

/// One heartbeat tick. A failed write is logged and the interval keeps
/// running.
async fn beat(shared: Weak<Shared>) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut state = shared.state.lock().await;
    if state.phase != HeartbeatPhase::Running {
        return;
    }

    match shared
        .store
        .put_presence(&shared.actor_id, PresenceUpdate::online_at(Utc::now()))
        .await
    {
        Ok(()) => {
            state.stats.beats += 1;
            debug!(actor_id = %shared.actor_id, beats = state.stats.beats, "Heartbeat written");
        }
        Err(e) => {
            state.stats.failed_beats += 1;
            warn!(
                actor_id = %shared.actor_id,
                error = %e,
                transient = e.is_transient(),
                failed = state.stats.failed_beats,
                "Heartbeat write failed, retrying next tick"
            );
        }
    }
}
