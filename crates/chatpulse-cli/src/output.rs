//! Table and JSON rendering for CLI commands.
//!
//! Lists render one row per item. Single items render as a two-column
//! field/value table, with nested objects flattened into dotted keys
//! (`presence.heartbeat_interval_seconds`).

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One line of a single-item table.
#[derive(Debug, PartialEq, Eq, Tabled)]
struct Field {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print a list of rows
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("(none)"),
        OutputFormat::Table => println!("{}", Table::new(items)),
        OutputFormat::Json => print_json(&items),
    }
}

/// Print a single item
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => match serde_json::to_value(item) {
            Ok(value) => {
                let mut fields = Vec::new();
                flatten("", &value, &mut fields);
                println!("{}", Table::new(fields));
            }
            Err(e) => print_error(&format!("Cannot render item: {e}")),
        },
        OutputFormat::Json => print_json(item),
    }
}

fn print_json<T: Serialize + ?Sized>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Cannot render JSON: {e}")),
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<Field>) {
    let key = || {
        if prefix.is_empty() {
            "value".to_string()
        } else {
            prefix.to_string()
        }
    };
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (name, child) in map {
                let nested = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten(&nested, child, out);
            }
        }
        Value::String(s) => out.push(Field {
            key: key(),
            value: s.clone(),
        }),
        Value::Null => out.push(Field {
            key: key(),
            value: "-".to_string(),
        }),
        other => out.push(Field {
            key: key(),
            value: other.to_string(),
        }),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {value}", format!("{key}:"));
}
