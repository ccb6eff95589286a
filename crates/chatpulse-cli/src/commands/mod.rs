//! CLI command definitions and dispatch.

pub mod config;
pub mod resolve;
pub mod simulate;
pub mod typing;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use chatpulse_core::config::AppConfig;
use chatpulse_core::error::AppError;

/// chatpulse — presence and typing indicators for chat
#[derive(Debug, Parser)]
#[command(name = "chatpulse", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (`config/<env>.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a presence record into its display state
    Resolve(resolve::ResolveArgs),
    /// Compute who is typing from a set of flags
    Typing(typing::TypingArgs),
    /// Run a scripted session against the in-memory store
    Simulate(simulate::SimulateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Resolve(args) => {
                let config = self.load_config()?;
                resolve::execute(args, &config, self.format)
            }
            Commands::Typing(args) => {
                let config = self.load_config()?;
                typing::execute(args, &config, self.format)
            }
            Commands::Simulate(args) => {
                let config = self.load_config()?;
                simulate::execute(args, &config, self.format).await
            }
            Commands::Config(args) => config::execute(args, self, self.format).await,
        }
    }

    /// Load configuration from the selected file and environment overlay
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &self.env)
    }
}
