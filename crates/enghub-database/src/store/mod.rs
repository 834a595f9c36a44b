//! Store providers and the [`Database`] handle that dispatches to the
//! configured one.

mod eval;
pub mod memory;
pub mod postgres;
mod sql;

use std::sync::Arc;

use tracing::info;

use enghub_core::config::DatabaseConfig;
use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::traits::{StoreProvider, StoreSession};

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Application-wide store handle.
///
/// The provider is selected at construction time from configuration. Each
/// logical unit of work calls [`Database::open_session`] and builds its
/// repositories and unit of work over that one session.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<dyn StoreProvider>,
}

impl Database {
    /// Connect the provider named by `config.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let inner: Arc<dyn StoreProvider> = match config.provider.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL store provider");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Arc::new(PostgresStore::new(pool))
            }
            "memory" => {
                info!("Initializing in-memory store provider");
                Arc::new(MemoryStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown database provider: '{other}'. Supported: postgres, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Wrap an existing provider.
    pub fn from_provider(provider: Arc<dyn StoreProvider>) -> Self {
        Self { inner: provider }
    }

    /// A fresh in-memory database.
    pub fn in_memory() -> Self {
        Self::from_provider(Arc::new(MemoryStore::new()))
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }

    /// Open a session for one logical unit of work.
    pub fn open_session(&self) -> Arc<dyn StoreSession> {
        self.inner.open_session()
    }

    /// Check backend connectivity.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    /// Shut the provider down.
    pub async fn close(&self) {
        self.inner.close().await;
    }
}

#[cfg(test)]
mod tests {
    use enghub_core::config::AppConfig;
    use enghub_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_connect_memory_provider() {
        let config = AppConfig::in_memory();
        let database = Database::connect(&config.database).await.expect("connect");
        assert_eq!(database.provider_name(), "memory");
        assert!(database.health_check().await.expect("health"));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let config = DatabaseConfig {
            provider: "sqlite".to_string(),
            ..DatabaseConfig::default()
        };
        let err = Database::connect(&config).await.expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
