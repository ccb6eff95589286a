//! Owned, cancelable timers backed by tokio tasks.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A one-shot or repeating timer owned by exactly one component.
///
/// Cancelling is idempotent, and dropping the timer cancels it.
#[derive(Debug)]
pub struct Timer {
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    /// Run `task` once after `delay`.
    pub fn after<F>(delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            task.await;
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Run `tick` immediately and then every `period`.
    ///
    /// A tick that overruns the period delays the next one instead of
    /// bursting to catch up.
    /// A zero `period` is treated as one millisecond.
    pub fn every<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period.max(MIN_PERIOD));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Cancel the timer. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the timer has neither been cancelled nor run to completion.
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.cancel();
    }
}
