//! In-process store provider.
//!
//! Tables are vectors of JSON rows kept in insertion order. A batch is
//! applied to a copy of the tables and swapped in only when every change
//! succeeded, so a rejected commit leaves nothing behind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use enghub_core::error::AppError;
use enghub_core::result::AppResult;
use enghub_core::traits::{
    ChangeKind, ChangeTracker, ColumnType, QuerySpec, StagedChange, StoreProvider, StoreSession,
    TableSchema, Window,
};

use super::eval;

type Tables = HashMap<&'static str, Vec<Value>>;

/// Shared in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreProvider for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn open_session(&self) -> Arc<dyn StoreSession> {
        Arc::new(MemorySession {
            tables: Arc::clone(&self.tables),
            tracker: ChangeTracker::new(),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// One scope over the shared in-memory tables.
#[derive(Debug)]
pub struct MemorySession {
    tables: Arc<RwLock<Tables>>,
    tracker: ChangeTracker,
}

fn key_of(row: &Value, schema: &TableSchema) -> Option<Uuid> {
    row.get(schema.key)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn position(rows: &[Value], schema: &TableSchema, key: Uuid) -> Option<usize> {
    rows.iter().position(|row| key_of(row, schema) == Some(key))
}

/// Check a row against the column constraints and keep only known columns.
fn normalize(schema: &TableSchema, row: &Value) -> AppResult<Value> {
    let mut normalized = Map::new();
    for column in schema.columns {
        let value = row.get(column.name).cloned().unwrap_or(Value::Null);
        let valid = match (&value, column.column_type) {
            (Value::Null, _) => column.nullable,
            (Value::String(s), ColumnType::Uuid) => Uuid::parse_str(s).is_ok(),
            (Value::String(s), ColumnType::Text) => column
                .max_length
                .is_none_or(|max| s.chars().count() <= max),
            (Value::Bool(_), ColumnType::Boolean) => true,
            (Value::Number(n), ColumnType::Integer) => n.is_i64(),
            _ => false,
        };
        if !valid {
            return Err(AppError::database(format!(
                "Value {value} violates the constraints of column '{}.{}'",
                schema.name, column.name
            )));
        }
        normalized.insert(column.name.to_string(), value);
    }
    Ok(Value::Object(normalized))
}

fn apply_change(tables: &mut Tables, change: &StagedChange) -> AppResult<()> {
    let schema = &change.schema;
    let rows = tables.entry(schema.name).or_default();
    let existing = position(rows, schema, change.key);

    match (change.kind, existing) {
        (ChangeKind::Insert, Some(_)) => Err(AppError::conflict(format!(
            "Duplicate key {} in '{}'",
            change.key, schema.name
        ))),
        (ChangeKind::Insert, None) => {
            let row = normalize(schema, &change.row)?;
            if key_of(&row, schema) != Some(change.key) {
                return Err(AppError::invalid_argument(format!(
                    "Row key does not match staged key {}",
                    change.key
                )));
            }
            rows.push(row);
            Ok(())
        }
        (ChangeKind::Update, Some(index)) => {
            rows[index] = normalize(schema, &change.row)?;
            Ok(())
        }
        (ChangeKind::Delete, Some(index)) => {
            rows.remove(index);
            Ok(())
        }
        (ChangeKind::Update | ChangeKind::Delete, None) => Err(AppError::conflict(format!(
            "Row {} in '{}' no longer exists",
            change.key, schema.name
        ))),
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn find(&self, schema: &TableSchema, key: Uuid) -> AppResult<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables.get(schema.name).and_then(|rows| {
            position(rows, schema, key).map(|index| rows[index].clone())
        }))
    }

    async fn count(&self, query: QuerySpec<'_>) -> AppResult<u64> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(query.schema.name) else {
            return Ok(0);
        };
        let mut total = 0u64;
        for row in rows {
            if eval::matches(row, &query.schema, query.filter)? {
                total += 1;
            }
        }
        Ok(total)
    }

    async fn fetch(
        &self,
        query: QuerySpec<'_>,
        projection: Option<&[&'static str]>,
        window: Option<Window>,
    ) -> AppResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(query.schema.name) else {
            return Ok(Vec::new());
        };

        let mut selected = Vec::new();
        for row in rows {
            if eval::matches(row, &query.schema, query.filter)? {
                selected.push(row);
            }
        }
        if let Some(sort) = query.sort {
            eval::sort_rows(&mut selected, &query.schema, sort)?;
        }

        let (skip, take) = match window {
            Some(w) => (
                usize::try_from(w.offset).unwrap_or(usize::MAX),
                usize::try_from(w.limit).unwrap_or(usize::MAX),
            ),
            None => (0, usize::MAX),
        };
        Ok(selected
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|row| match projection {
                Some(columns) => eval::project(row, columns),
                None => row.clone(),
            })
            .collect())
    }

    async fn apply(&self, changes: &[StagedChange]) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        for change in changes {
            apply_change(&mut staged, change)?;
        }
        *tables = staged;
        debug!(changes = changes.len(), "Applied batch to memory store");
        Ok(())
    }

    fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use enghub_core::error::ErrorKind;
    use enghub_core::traits::Entity;
    use enghub_core::types::{Filter, FilterField, SortField};
    use enghub_entity::Engineer;

    use super::*;

    fn row(key: Uuid, name: &str, name_ar: &str) -> Value {
        json!({"id": key, "name": name, "name_ar": name_ar})
    }

    fn everything() -> QuerySpec<'static> {
        QuerySpec {
            schema: Engineer::SCHEMA,
            filter: None,
            sort: None,
        }
    }

    async fn seeded(names: &[&str]) -> Arc<dyn StoreSession> {
        let store = MemoryStore::new();
        let session = store.open_session();
        let changes: Vec<_> = names
            .iter()
            .map(|name| {
                let key = Uuid::new_v4();
                StagedChange::insert(Engineer::SCHEMA, key, row(key, name, "x"))
            })
            .collect();
        session.apply(&changes).await.expect("seed");
        session
    }

    #[tokio::test]
    async fn test_fetch_keeps_insertion_order_and_windows() {
        let session = seeded(&["c", "a", "b"]).await;
        let window = Window {
            offset: 1,
            limit: 5,
        };
        let rows = session
            .fetch(everything(), Some(&["name"][..]), Some(window))
            .await
            .expect("fetch");
        assert_eq!(rows, vec![json!({"name": "a"}), json!({"name": "b"})]);
    }

    #[tokio::test]
    async fn test_filter_then_sort() {
        let session = seeded(&["Sara", "Ali", "Samir"]).await;
        let filter = Filter::from_field(FilterField::ilike("name", "s%"));
        let sort = SortField::asc("name");
        let query = QuerySpec {
            schema: Engineer::SCHEMA,
            filter: Some(&filter),
            sort: Some(&sort),
        };
        assert_eq!(session.count(query).await.expect("count"), 2);
        let names: Vec<_> = session
            .fetch(query, None, None)
            .await
            .expect("fetch")
            .into_iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["Samir", "Sara"]);
    }

    #[tokio::test]
    async fn test_failed_batch_changes_nothing() {
        let session = seeded(&["Ali"]).await;
        let key = Uuid::new_v4();
        let too_long = "x".repeat(101);
        let err = session
            .apply(&[
                StagedChange::insert(Engineer::SCHEMA, key, row(key, "Sara", "سارة")),
                StagedChange::insert(
                    Engineer::SCHEMA,
                    Uuid::nil(),
                    row(Uuid::nil(), &too_long, "x"),
                ),
            ])
            .await
            .expect_err("too long");
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(session.count(everything()).await.expect("count"), 1);
        assert!(session.find(&Engineer::SCHEMA, key).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn test_length_limit_counts_characters() {
        let session = seeded(&[]).await;
        let key = Uuid::new_v4();
        let arabic = "ع".repeat(100);
        session
            .apply(&[StagedChange::insert(Engineer::SCHEMA, key, row(key, "n", &arabic))])
            .await
            .expect("100 characters fit");
    }

    #[tokio::test]
    async fn test_conflicts() {
        let session = seeded(&[]).await;
        let key = Uuid::new_v4();
        let insert = StagedChange::insert(Engineer::SCHEMA, key, row(key, "Ali", "علي"));
        session.apply(&[insert.clone()]).await.expect("insert");

        let err = session.apply(&[insert]).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = session
            .apply(&[StagedChange::delete(Engineer::SCHEMA, Uuid::new_v4())])
            .await
            .expect_err("missing");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_sessions_share_tables() {
        let store = MemoryStore::new();
        let writer = store.open_session();
        let reader = store.open_session();
        let key = Uuid::new_v4();
        writer
            .apply(&[StagedChange::insert(Engineer::SCHEMA, key, row(key, "Ali", "علي"))])
            .await
            .expect("insert");
        let found = reader.find(&Engineer::SCHEMA, key).await.expect("find");
        assert_eq!(found.map(|r| r["name"].clone()), Some(json!("Ali")));
    }
}
