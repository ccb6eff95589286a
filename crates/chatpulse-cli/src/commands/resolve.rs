//! One-shot presence resolution.

use clap::Args;
use chrono::{DateTime, Utc};
use serde::Serialize;

use chatpulse_core::config::AppConfig;
use chatpulse_core::error::AppError;
use chatpulse_realtime::presence::{DisplayState, PresenceResolver};

use crate::output::{self, OutputFormat};

/// Arguments for the resolve command
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// The actor's explicit online flag
    #[arg(long)]
    pub online: bool,
    /// Last-seen timestamp (RFC 3339); omit for an actor never seen
    #[arg(long)]
    pub last_seen: Option<String>,
    /// Evaluation time (RFC 3339), defaults to the current time
    #[arg(long)]
    pub now: Option<String>,
}

#[derive(Debug, Serialize)]
struct Resolution {
    text: String,
    display: DisplayState,
    evaluated_at: DateTime<Utc>,
}

/// Execute the resolve command
pub fn execute(args: &ResolveArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let last_seen = args.last_seen.as_deref().map(parse_timestamp).transpose()?;
    let now = match args.now.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => Utc::now(),
    };

    let display = PresenceResolver::from_config(&config.presence).resolve(args.online, last_seen, now);
    output::print_item(
        &Resolution {
            text: display.to_string(),
            display,
            evaluated_at: now,
        },
        format,
    );
    Ok(())
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::validation(format!("Invalid timestamp '{raw}': {e}")))
}
