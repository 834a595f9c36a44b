//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use enghub_core::config::AppConfig;
use enghub_database::Database;
use enghub_service::{EngineerService, ValidatorRegistry};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Request-scoped
/// services are built from it per request so each request gets its own
/// store session.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Store handle
    pub database: Database,
    /// Validators, filled at startup
    pub validators: Arc<ValidatorRegistry>,
    /// Cancelled when the server begins shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Builds the state with the default validator set.
    pub fn new(config: AppConfig, database: Database) -> Self {
        Self {
            config: Arc::new(config),
            database,
            validators: Arc::new(ValidatorRegistry::with_defaults()),
            shutdown: CancellationToken::new(),
        }
    }

    /// An engineer service over a fresh session.
    pub fn engineer_service(&self) -> EngineerService {
        EngineerService::new(self.database.open_session(), Arc::clone(&self.validators))
    }

    /// Token for one request; cancelled on shutdown.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
