//! PostgreSQL store provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use enghub_core::error::{AppError, ErrorKind};
use enghub_core::result::AppResult;
use enghub_core::traits::{
    ChangeKind, ChangeTracker, QuerySpec, StagedChange, StoreProvider, StoreSession, TableSchema,
    Window,
};

use super::sql;
use crate::connection::DatabasePool;

/// Store provider backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: DatabasePool,
}

impl PostgresStore {
    /// Create a provider over an opened pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreProvider for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn open_session(&self) -> Arc<dyn StoreSession> {
        Arc::new(PostgresSession {
            pool: self.pool.pool().clone(),
            tracker: ChangeTracker::new(),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.pool.health_check().await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// One scope over the shared pool. Reads use pooled connections; a commit
/// runs in its own transaction.
#[derive(Debug)]
pub struct PostgresSession {
    pool: PgPool,
    tracker: ChangeTracker,
}

fn read_error(table: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Database,
        format!("Failed to read from '{table}': {e}"),
        e,
    )
}

fn write_error(change: &StagedChange, e: sqlx::Error) -> AppError {
    let unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
    let kind = if unique {
        ErrorKind::Conflict
    } else {
        ErrorKind::Database
    };
    AppError::with_source(
        kind,
        format!(
            "Failed to {:?} {} in '{}': {e}",
            change.kind, change.key, change.schema.name
        ),
        e,
    )
}

#[async_trait]
impl StoreSession for PostgresSession {
    async fn find(&self, schema: &TableSchema, key: Uuid) -> AppResult<Option<Value>> {
        sql::find(schema, key)
            .build_query_scalar::<Value>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| read_error(schema.name, e))
    }

    async fn count(&self, query: QuerySpec<'_>) -> AppResult<u64> {
        let total = sql::count(query)?
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| read_error(query.schema.name, e))?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn fetch(
        &self,
        query: QuerySpec<'_>,
        projection: Option<&[&'static str]>,
        window: Option<Window>,
    ) -> AppResult<Vec<Value>> {
        sql::select(query, projection, window)?
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| read_error(query.schema.name, e))
    }

    async fn apply(&self, changes: &[StagedChange]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        for change in changes {
            let mut statement = sql::write(change)?;
            let result = statement
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| write_error(change, e))?;

            if change.kind != ChangeKind::Insert && result.rows_affected() == 0 {
                warn!(
                    table = change.schema.name,
                    key = %change.key,
                    "Staged change matched no row; rolling back"
                );
                return Err(AppError::conflict(format!(
                    "Row {} in '{}' no longer exists",
                    change.key, change.schema.name
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        debug!(changes = changes.len(), "Committed batch to PostgreSQL");
        Ok(())
    }

    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }
}
