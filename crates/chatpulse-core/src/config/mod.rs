//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default, so an empty file is a
//! valid configuration.

pub mod logging;
pub mod presence;
pub mod store;
pub mod typing;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::presence::PresenceConfig;
use self::store::StoreConfig;
use self::typing::TypingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Heartbeat and presence resolution settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Typing indicator settings.
    #[serde(default)]
    pub typing: TypingConfig,
    /// Realtime store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CHATPULSE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration using an explicit base file path. The extension
    /// may be omitted.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHATPULSE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Parse configuration from a TOML string, without file or environment
    /// overlays.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Reject values that would make timers spin or channels unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.presence.heartbeat_interval_seconds == 0 {
            return Err(AppError::configuration(
                "presence.heartbeat_interval_seconds must be greater than zero",
            ));
        }
        if self.typing.timeout_ms == 0 {
            return Err(AppError::configuration(
                "typing.timeout_ms must be greater than zero",
            ));
        }
        if self.store.channel_buffer_size == 0 {
            return Err(AppError::configuration(
                "store.channel_buffer_size must be greater than zero",
            ));
        }
        if self.typing.fallback_label.trim().is_empty() {
            return Err(AppError::configuration(
                "typing.fallback_label must not be empty",
            ));
        }
        Ok(())
    }
}
