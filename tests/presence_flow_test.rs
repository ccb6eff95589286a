//! Integration tests for heartbeats, sign-out and presence display.

mod helpers;

use std::time::Duration;

use chrono::Utc;
use tokio::time;

use chatpulse_core::traits::store::PresenceStore;
use chatpulse_core::types::change::{StoreChange, StorePath};
use chatpulse_realtime::heartbeat::HeartbeatPhase;
use chatpulse_realtime::{DisplayState, PresenceMonitor, PresenceResolver, StopOutcome};

use helpers::{FlakyStore, actor, settle, sign_in};

#[tokio::test(start_paused = true)]
async fn test_sign_in_shows_online_to_watchers() {
    let store = FlakyStore::new();
    let mut changes = store
        .subscribe(&StorePath::presence(actor("alice")))
        .await
        .unwrap();

    let _alice = sign_in(&store, "alice");
    settle().await;

    match changes.recv().await.unwrap() {
        StoreChange::Presence(record) => {
            assert_eq!(record.actor_id, actor("alice"));
            assert!(record.online);
            assert!(record.last_seen.is_some());
        }
        other => panic!("unexpected change: {other:?}"),
    }

    let monitor = PresenceMonitor::new(store.clone(), PresenceResolver::default(), 16);
    assert_eq!(
        monitor.display_state(&actor("alice"), Utc::now()).await,
        DisplayState::Online
    );
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_repeats_until_sign_out() {
    let store = FlakyStore::new();
    let alice = sign_in(&store, "alice");
    settle().await;

    time::sleep(Duration::from_secs(51)).await;
    assert_eq!(store.presence_log(&actor("alice")), vec![true, true, true]);

    assert_eq!(alice.sign_out().await, StopOutcome::Stopped);
    time::sleep(Duration::from_secs(120)).await;
    assert_eq!(
        store.presence_log(&actor("alice")),
        vec![true, true, true, false]
    );
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_racing_unload_writes_offline_once() {
    let store = FlakyStore::new();
    let alice = sign_in(&store, "alice");
    settle().await;

    let (a, b) = tokio::join!(alice.sign_out(), alice.on_unload());
    let mut outcomes = [a, b];
    outcomes.sort_by_key(|o| *o == StopOutcome::AlreadyStopped);
    assert_eq!(
        outcomes,
        [StopOutcome::Stopped, StopOutcome::AlreadyStopped]
    );
    assert_eq!(store.presence_log(&actor("alice")), vec![true, false]);
    assert_eq!(alice.heartbeat().phase().await, HeartbeatPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_signed_out_actor_shows_last_seen() {
    let store = FlakyStore::new();
    let alice = sign_in(&store, "alice");
    settle().await;
    alice.sign_out().await;

    let monitor = PresenceMonitor::new(store.clone(), PresenceResolver::default(), 16);
    let now = Utc::now();
    // Inside the grace window a fresh sign-out still reads as online.
    assert_eq!(
        monitor.display_state(&actor("alice"), now).await,
        DisplayState::Online
    );
    assert_eq!(
        monitor
            .display_state(&actor("alice"), now + chrono::TimeDelta::seconds(45))
            .await,
        DisplayState::LastSeenJustNow
    );
    assert_eq!(
        monitor
            .display_state(&actor("alice"), now + chrono::TimeDelta::hours(3))
            .await,
        DisplayState::LastSeenHoursAgo { hours: 3 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_offline_write_retried_after_outage() {
    let store = FlakyStore::new();
    let alice = sign_in(&store, "alice");
    settle().await;

    store.set_failing(true);
    assert_eq!(alice.sign_out().await, StopOutcome::WriteFailed);

    store.set_failing(false);
    assert_eq!(alice.on_unload().await, StopOutcome::Stopped);
    assert_eq!(store.presence_log(&actor("alice")), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_monitor_keeps_last_known_state_during_outage() {
    let store = FlakyStore::new();
    let _alice = sign_in(&store, "alice");
    settle().await;

    let monitor = PresenceMonitor::new(store.clone(), PresenceResolver::default(), 16);
    let ids = [actor("alice"), actor("nobody")];
    let states = monitor.display_states(&ids, Utc::now()).await;
    assert_eq!(states[0].1, DisplayState::Online);
    assert_eq!(states[1].1, DisplayState::Offline);

    store.set_failing(true);
    assert_eq!(
        monitor.display_state(&actor("alice"), Utc::now()).await,
        DisplayState::Online
    );
    assert_eq!(
        monitor.display_state(&actor("stranger"), Utc::now()).await,
        DisplayState::Offline
    );
}
