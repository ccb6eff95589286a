//! Scripted session run against the in-memory store.
//!
//! Signs an actor in, types a burst of keystrokes into one conversation,
//! then either sends the message or lets the typing timeout lapse, and
//! finally signs out. Every store change observed on the actor's presence
//! path and the conversation's typing path is printed with its offset from
//! sign-in.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};
use tracing::{info, warn};

use chatpulse_core::config::AppConfig;
use chatpulse_core::error::AppError;
use chatpulse_core::traits::store::{PresenceStore, Subscription};
use chatpulse_core::types::change::{StoreChange, StorePath};
use chatpulse_core::types::id::{ActorId, ConversationId};
use chatpulse_realtime::{ChatSession, SessionOptions};
use chatpulse_store::MemoryPresenceStore;

use crate::output::{self, OutputFormat};

/// Arguments for the simulate command
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Actor signing in
    #[arg(long, default_value = "alice")]
    pub actor: String,
    /// Conversation typed into
    #[arg(long, default_value = "general")]
    pub conversation: String,
    /// Number of keystrokes in the burst
    #[arg(long, default_value_t = 5)]
    pub keystrokes: u32,
    /// Gap between keystrokes in milliseconds
    #[arg(long, default_value_t = 400)]
    pub gap_ms: u64,
    /// Typing timeout override in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Send the message after the burst instead of waiting for the timeout
    #[arg(long)]
    pub send: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct ChangeRow {
    #[tabled(rename = "At (ms)")]
    at_ms: u128,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Change")]
    change: String,
}

/// Execute the simulate command
pub async fn execute(
    args: &SimulateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let actor_id = ActorId::new(args.actor.as_str())?;
    let conversation_id = ConversationId::new(args.conversation.as_str())?;

    let mut options = SessionOptions::from_config(config);
    if let Some(ms) = args.timeout_ms.filter(|ms| *ms > 0) {
        options.typing_timeout = Duration::from_millis(ms);
    }

    let store: Arc<dyn PresenceStore> = Arc::new(MemoryPresenceStore::new(&config.store));
    let presence_rx = store.subscribe(&StorePath::presence(actor_id.clone())).await?;
    let typing_rx = store.subscribe(&StorePath::typing(conversation_id.clone())).await?;

    info!(
        actor_id = %actor_id,
        conversation_id = %conversation_id,
        keystrokes = args.keystrokes,
        gap_ms = args.gap_ms,
        timeout_ms = options.typing_timeout.as_millis() as u64,
        send = args.send,
        "Starting simulation"
    );

    let started = Instant::now();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let collector = tokio::spawn(collect(presence_rx, typing_rx, started, tx));

    let session = ChatSession::start(Arc::clone(&store), actor_id, options);
    for _ in 0..args.keystrokes {
        session.notify_typing(&conversation_id).await;
        time::sleep(Duration::from_millis(args.gap_ms)).await;
    }
    if args.send {
        session.message_sent(&conversation_id).await;
    } else {
        time::sleep(options.typing_timeout + Duration::from_millis(100)).await;
    }
    let outcome = session.sign_out().await;

    // Let the collector drain what the sign-out published.
    time::sleep(Duration::from_millis(50)).await;
    collector.abort();

    let mut rows = Vec::new();
    while let Ok(row) = rx.try_recv() {
        rows.push(row);
    }
    info!(changes = rows.len(), outcome = ?outcome, "Simulation finished");
    output::print_list(&rows, format);
    if format == OutputFormat::Table {
        output::print_kv("Sign-out", &format!("{outcome:?}"));
    }
    Ok(())
}

async fn collect(
    mut presence_rx: Subscription,
    mut typing_rx: Subscription,
    started: Instant,
    tx: mpsc::UnboundedSender<ChangeRow>,
) {
    loop {
        let received = tokio::select! {
            r = presence_rx.recv() => r,
            r = typing_rx.recv() => r,
        };
        let change = match received {
            Ok(change) => change,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Simulation collector lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return,
        };
        let row = ChangeRow {
            at_ms: started.elapsed().as_millis(),
            path: change.path().to_string(),
            change: describe(&change),
        };
        if tx.send(row).is_err() {
            return;
        }
    }
}

fn describe(change: &StoreChange) -> String {
    match change {
        StoreChange::Presence(record) => format!(
            "online={} last_seen={}",
            record.online,
            record
                .last_seen
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string())
        ),
        StoreChange::Typing(flag) => format!("{} typing={}", flag.actor_id, flag.typing),
    }
}
