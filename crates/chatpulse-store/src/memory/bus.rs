//! Per-path change fan-out for single-node deployments.

use dashmap::DashMap;
use tokio::sync::broadcast;

use chatpulse_core::traits::store::Subscription;
use chatpulse_core::types::change::{StoreChange, StorePath};

/// Broadcasts store changes to the subscribers of each path.
#[derive(Debug)]
pub struct ChangeBus {
    /// Path → broadcast sender
    channels: DashMap<StorePath, broadcast::Sender<StoreChange>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl ChangeBus {
    /// Create a new change bus
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Publish a change on its own path. Returns the number of receivers
    /// that were notified. A channel found without receivers is removed.
    pub fn publish(&self, change: StoreChange) -> usize {
        let path = change.path();
        let sent = match self.channels.get(&path) {
            Some(tx) => tx.send(change).ok(),
            None => return 0,
        };
        match sent {
            Some(receivers) => receivers,
            None => {
                self.channels.remove_if(&path, |_, tx| tx.receiver_count() == 0);
                0
            }
        }
    }

    /// Subscribe to a path, returns a receiver. Registering a new path
    /// first sweeps abandoned channels.
    pub fn subscribe(&self, path: &StorePath) -> Subscription {
        if !self.channels.contains_key(path) {
            self.prune();
        }
        self.channels
            .entry(path.clone())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    /// Drop channels nobody listens to any more.
    pub fn prune(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, tx| tx.receiver_count() > 0);
        before - self.channels.len()
    }

    /// Number of paths with a live channel.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
