//! Store-backed presence lookups with a stale-but-available fallback.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::warn;

use chatpulse_core::config::presence::PresenceConfig;
use chatpulse_core::traits::store::PresenceStore;
use chatpulse_core::types::id::ActorId;

use super::display::DisplayState;
use super::resolver::PresenceResolver;

/// Reads presence records and resolves them for display.
///
/// The last successful resolution per actor is retained. When the store
/// cannot be read, that state is returned instead of an error, so the UI
/// keeps showing a stale but plausible status.
#[derive(Debug, Clone)]
pub struct PresenceMonitor {
    store: Arc<dyn PresenceStore>,
    resolver: PresenceResolver,
    last_known: Cache<ActorId, DisplayState>,
}

impl PresenceMonitor {
    /// Create a monitor.
    pub fn new(store: Arc<dyn PresenceStore>, resolver: PresenceResolver, capacity: u64) -> Self {
        Self {
            store,
            resolver,
            last_known: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Create a monitor from configuration.
    pub fn from_config(store: Arc<dyn PresenceStore>, config: &PresenceConfig) -> Self {
        Self::new(
            store,
            PresenceResolver::from_config(config),
            config.monitor_cache_capacity,
        )
    }

    /// Current display state of `actor_id` at `now`.
    pub async fn display_state(&self, actor_id: &ActorId, now: DateTime<Utc>) -> DisplayState {
        match self.store.get_presence(actor_id).await {
            Ok(record) => {
                let state = record
                    .map(|r| self.resolver.resolve_record(&r, now))
                    .unwrap_or(DisplayState::Offline);
                self.last_known.insert(actor_id.clone(), state).await;
                state
            }
            Err(e) => {
                let fallback = self.last_known.get(actor_id).await;
                warn!(
                    actor_id = %actor_id,
                    error = %e,
                    transient = e.is_transient(),
                    has_fallback = fallback.is_some(),
                    "Presence read failed, using last known state"
                );
                fallback.unwrap_or(DisplayState::Offline)
            }
        }
    }

    /// Display states of several actors, in input order.
    pub async fn display_states(
        &self,
        actor_ids: &[ActorId],
        now: DateTime<Utc>,
    ) -> Vec<(ActorId, DisplayState)> {
        let lookups = actor_ids
            .iter()
            .map(|id| async move { (id.clone(), self.display_state(id, now).await) });
        futures::future::join_all(lookups).await
    }

    /// The last successfully resolved state, without touching the store.
    pub async fn last_known(&self, actor_id: &ActorId) -> Option<DisplayState> {
        self.last_known.get(actor_id).await
    }
}
