//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use tracing::info;

use chatpulse_core::config::store::StoreConfig;
use chatpulse_core::error::AppError;
use chatpulse_core::result::AppResult;
use chatpulse_core::traits::store::PresenceStore;

/// Store manager that wraps the configured presence store.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store.
    inner: Arc<dyn PresenceStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn PresenceStore> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory presence store");
                Arc::new(crate::memory::MemoryPresenceStore::new(config))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn PresenceStore>) -> Self {
        Self { inner: store }
    }

    /// Shared handle to the inner store.
    pub fn store(&self) -> Arc<dyn PresenceStore> {
        Arc::clone(&self.inner)
    }
}
