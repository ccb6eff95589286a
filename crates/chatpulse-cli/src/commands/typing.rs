//! Typing set aggregation from the command line.

use std::collections::HashMap;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use chatpulse_core::config::AppConfig;
use chatpulse_core::error::AppError;
use chatpulse_core::types::id::ActorId;
use chatpulse_core::types::typing::TypingMap;
use chatpulse_realtime::typing::{TypingAggregator, typing_label};

use crate::output::{self, OutputFormat};

/// Arguments for the typing command
#[derive(Debug, Args)]
pub struct TypingArgs {
    /// Typing flag as `actor=true|false` (repeatable)
    #[arg(long = "flag", value_parser = parse_flag)]
    pub flags: Vec<(String, bool)>,
    /// Local actor, excluded from the result
    #[arg(long)]
    pub me: String,
    /// Display name as `actor=Name` (repeatable)
    #[arg(long = "name", value_parser = parse_name)]
    pub names: Vec<(String, String)>,
}

#[derive(Debug, Serialize, Tabled)]
struct TypingRow {
    #[tabled(rename = "Typing")]
    name: String,
}

#[derive(Debug, Serialize)]
struct TypingSummary {
    typing: Vec<String>,
    label: Option<String>,
}

/// Execute the typing command
pub fn execute(args: &TypingArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let me = ActorId::new(args.me.as_str())?;
    let flags = args
        .flags
        .iter()
        .map(|(actor, typing)| Ok((ActorId::new(actor.as_str())?, *typing)))
        .collect::<Result<TypingMap, AppError>>()?;
    let names: HashMap<&str, &str> = args
        .names
        .iter()
        .map(|(actor, name)| (actor.as_str(), name.as_str()))
        .collect();

    let aggregator = TypingAggregator::from_config(&config.typing);
    let typing = aggregator.who_is_typing(&flags, &me, |actor| {
        names.get(actor.as_str()).map(|n| n.to_string())
    });
    let label = typing_label(&typing);

    match format {
        OutputFormat::Table => {
            let rows: Vec<_> = typing.into_iter().map(|name| TypingRow { name }).collect();
            output::print_list(&rows, format);
            if let Some(label) = label {
                output::print_kv("Banner", &label);
            }
        }
        OutputFormat::Json => output::print_item(&TypingSummary { typing, label }, format),
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Result<(String, bool), String> {
    let (actor, value) = split_pair(raw)?;
    let typing = value
        .parse::<bool>()
        .map_err(|_| format!("expected true or false after '=' in '{raw}'"))?;
    Ok((actor, typing))
}

fn parse_name(raw: &str) -> Result<(String, String), String> {
    split_pair(raw)
}

fn split_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("bob=true").unwrap(), ("bob".to_string(), true));
        assert_eq!(parse_flag(" carol = false ").unwrap(), ("carol".to_string(), false));
        assert!(parse_flag("bob").is_err());
        assert!(parse_flag("bob=maybe").is_err());
        assert!(parse_flag("=true").is_err());
    }

    #[test]
    fn test_parse_name_keeps_spaces_inside() {
        assert_eq!(
            parse_name("bob=Bob Builder").unwrap(),
            ("bob".to_string(), "Bob Builder".to_string())
        );
    }
}
