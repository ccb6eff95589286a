//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use tracing::debug;

use super::Cli;
use crate::output::{self, OutputFormat};
use chatpulse_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,
    /// Validate the configuration
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, cli: &Cli, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            debug!(config = %cli.config, env = %cli.env, "Loading configuration");
            let config = cli.load_config()?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", cli.config));
                output::print_kv(
                    "Heartbeat interval",
                    &format!("{}s", config.presence.heartbeat_interval_seconds),
                );
                output::print_kv(
                    "Online grace",
                    &format!("{}s", config.presence.online_grace_seconds),
                );
                output::print_kv("Typing timeout", &format!("{}ms", config.typing.timeout_ms));
                output::print_kv("Store", &config.store.provider);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;
            debug!(path = %out_path, bytes = default_config.len(), "Default configuration written");

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}
