//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;
use vitrine_core::capability::SecretSet;
use vitrine_core::config::AppConfig;
use vitrine_storage::ObjectGateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object store gateway.
    pub gateway: Arc<dyn ObjectGateway>,
    /// Ordered rotation set of signing salts.
    pub secrets: Arc<SecretSet>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if access configuration validation fails with an error.
    pub fn new(config: AppConfig, gateway: Arc<dyn ObjectGateway>) -> Self {
        // Fail fast: a server with neither salts nor an allow-list can serve nothing.
        if let Err(error) = config.access.validate() {
            panic!("Invalid access configuration: {}", error);
        }

        let secrets = SecretSet::new(config.access.hash_salts.clone());

        Self {
            config: Arc::new(config),
            gateway,
            secrets: Arc::new(secrets),
        }
    }

    /// Upper bound on any single object store round trip.
    pub fn gateway_timeout(&self) -> Duration {
        self.config.server.gateway_timeout()
    }
}
