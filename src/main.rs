//! chatpulse agent
//!
//! Signs one actor in against the configured presence store, keeps its
//! heartbeat running, logs the display state of watched actors as their
//! presence records change, and signs out on shutdown.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::{EnvFilter, fmt};

use chatpulse_core::config::AppConfig;
use chatpulse_core::error::AppError;
use chatpulse_core::types::change::{StoreChange, StorePath};
use chatpulse_core::types::id::ActorId;
use chatpulse_realtime::{ChatSession, PresenceMonitor, SessionOptions};
use chatpulse_store::StoreManager;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("CHATPULSE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("CHATPULSE_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Parse `CHATPULSE_WATCH`, a comma-separated list of actor ids.
fn watched_actors(raw: &str) -> Result<Vec<ActorId>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ActorId::new)
        .collect()
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting chatpulse agent v{}", env!("CARGO_PKG_VERSION"));

    let actor_id = std::env::var("CHATPULSE_ACTOR")
        .map_err(|_| AppError::configuration("CHATPULSE_ACTOR must be set"))
        .and_then(ActorId::new)?;
    let watched = watched_actors(&std::env::var("CHATPULSE_WATCH").unwrap_or_default())?;

    tracing::info!(provider = %config.store.provider, "Initializing presence store");
    let store = StoreManager::new(&config.store)?.store();
    if !store.health_check().await? {
        return Err(AppError::service_unavailable("Presence store is not healthy"));
    }

    let session = ChatSession::start(
        Arc::clone(&store),
        actor_id,
        SessionOptions::from_config(&config),
    );

    let monitor = Arc::new(PresenceMonitor::from_config(Arc::clone(&store), &config.presence));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut watchers = Vec::with_capacity(watched.len());
    for actor in watched {
        let changes = store.subscribe(&StorePath::presence(actor.clone())).await?;
        watchers.push(tokio::spawn(watch_presence(
            actor,
            changes,
            Arc::clone(&monitor),
            shutdown_rx.clone(),
        )));
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, signing out...");
    let _ = shutdown_tx.send(true);

    let outcome = session.on_unload().await;
    tracing::info!(outcome = ?outcome, "Session ended");

    for watcher in watchers {
        let _ = watcher.await;
    }
    Ok(())
}

/// Log the display state of `actor_id` whenever its presence record changes.
async fn watch_presence(
    actor_id: ActorId,
    mut changes: broadcast::Receiver<StoreChange>,
    monitor: Arc<PresenceMonitor>,
    mut shutdown: watch::Receiver<bool>,
) {
    let state = monitor.display_state(&actor_id, Utc::now()).await;
    tracing::info!(actor_id = %actor_id, display = %state, "Watching presence");

    loop {
        tokio::select! {
            received = changes.recv() => match received {
                Ok(StoreChange::Presence(_)) => {
                    let state = monitor.display_state(&actor_id, Utc::now()).await;
                    tracing::info!(actor_id = %actor_id, display = %state, "Presence changed");
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(actor_id = %actor_id, skipped, "Presence watcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = shutdown.changed() => break,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watched_actors_skips_blanks() {
        let actors = watched_actors(" bob, ,carol,").unwrap();
        let names: Vec<_> = actors.iter().map(ActorId::as_str).collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[test]
    fn test_watched_actors_empty() {
        assert!(watched_actors("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_watch_presence_tracks_changes_until_shutdown() {
        use chatpulse_core::traits::store::PresenceStore;
        use chatpulse_core::types::presence::PresenceUpdate;
        use chatpulse_realtime::{DisplayState, PresenceResolver};
        use chatpulse_store::MemoryPresenceStore;

        let store: Arc<dyn PresenceStore> = Arc::new(MemoryPresenceStore::default());
        let bob = ActorId::new("bob").unwrap();
        let monitor = Arc::new(PresenceMonitor::new(
            Arc::clone(&store),
            PresenceResolver::default(),
            16,
        ));
        let changes = store.subscribe(&StorePath::presence(bob.clone())).await.unwrap();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let watcher = tokio::spawn(watch_presence(
            bob.clone(),
            changes,
            Arc::clone(&monitor),
            shutdown_rx,
        ));
        store
            .put_presence(&bob, PresenceUpdate::online_at(Utc::now()))
            .await
            .unwrap();

        let mut seen = None;
        for _ in 0..100 {
            seen = monitor.last_known(&bob).await;
            if seen == Some(DisplayState::Online) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(seen, Some(DisplayState::Online));

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), watcher)
            .await
            .expect("watcher stops on shutdown")
            .unwrap();
    }
}
