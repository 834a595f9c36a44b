//! Store handle contracts and the per-scope change tracker.
//!
//! A [`StoreProvider`] is the long-lived backend (a connection pool, an
//! in-memory table set). Every logical unit of work opens its own
//! [`StoreSession`], which is never shared between concurrent operations.
//! Rows cross the session boundary as JSON objects keyed by column name.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;
use crate::traits::entity::TableSchema;
use crate::types::filter::Filter;
use crate::types::sorting::SortField;

/// Row window applied after filtering and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Rows to skip.
    pub offset: u64,
    /// Maximum rows to return.
    pub limit: u64,
}

/// A read against one table: optional filter and optional sort key.
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec<'a> {
    /// Target table.
    pub schema: TableSchema,
    /// Rows must satisfy every condition; `None` matches everything.
    pub filter: Option<&'a Filter>,
    /// Explicit ordering; `None` leaves the store's natural order.
    pub sort: Option<&'a SortField>,
}

/// Kind of a staged mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    /// New row.
    Insert,
    /// Replace an existing row.
    Update,
    /// Physically remove a row.
    Delete,
}

/// A mutation waiting for the next commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedChange {
    /// Target table.
    pub schema: TableSchema,
    /// Primary key of the affected row.
    pub key: Uuid,
    /// Mutation kind.
    pub kind: ChangeKind,
    /// Full row for inserts and updates; `Value::Null` for deletes.
    pub row: Value,
}

impl StagedChange {
    /// Stage a new row.
    pub fn insert(schema: TableSchema, key: Uuid, row: Value) -> Self {
        Self {
            schema,
            key,
            kind: ChangeKind::Insert,
            row,
        }
    }

    /// Stage a full-row update.
    pub fn update(schema: TableSchema, key: Uuid, row: Value) -> Self {
        Self {
            schema,
            key,
            kind: ChangeKind::Update,
            row,
        }
    }

    /// Stage a physical removal.
    pub fn delete(schema: TableSchema, key: Uuid) -> Self {
        Self {
            schema,
            key,
            kind: ChangeKind::Delete,
            row: Value::Null,
        }
    }

    fn targets(&self, table: &str, key: Uuid) -> bool {
        self.schema.name == table && self.key == key
    }
}

type SnapshotKey = (&'static str, Uuid);

/// Staged mutations and tracked snapshots of one session.
///
/// Staging coalesces changes to the same row so that a commit carries at
/// most one change per `(table, key)`, except for an insert staged over a
/// pending insert or update, which is kept so the store can reject the
/// duplicate key.
///
/// | staged | then   | result                          |
/// |--------|--------|---------------------------------|
/// | Insert | Update | Insert with the newer row       |
/// | Insert | Delete | nothing                         |
/// | Update | Update | Update with the newer row       |
/// | Update | Delete | Delete                          |
/// | Delete | Insert | Update with the inserted row    |
/// | Delete | Update | rejected with `Conflict`        |
/// | Delete | Delete | Delete                          |
#[derive(Debug, Default)]
pub struct ChangeTracker {
    staged: Mutex<Vec<StagedChange>>,
    snapshots: Mutex<HashMap<SnapshotKey, Value>>,
}

impl ChangeTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change, merging it with an earlier one for the same row.
    pub fn stage(&self, change: StagedChange) -> AppResult<()> {
        let mut staged = self.staged.lock().unwrap_or_else(|e| e.into_inner());
        let existing = staged
            .iter()
            .rposition(|c| c.targets(change.schema.name, change.key));

        let Some(index) = existing else {
            staged.push(change);
            return Ok(());
        };

        match (staged[index].kind, change.kind) {
            (ChangeKind::Insert | ChangeKind::Update, ChangeKind::Insert) => staged.push(change),
            (ChangeKind::Insert | ChangeKind::Update, ChangeKind::Update) => {
                staged[index].row = change.row;
            }
            (ChangeKind::Insert, ChangeKind::Delete) => {
                staged.remove(index);
            }
            (ChangeKind::Update | ChangeKind::Delete, ChangeKind::Delete) => {
                staged[index] = change;
            }
            (ChangeKind::Delete, ChangeKind::Insert) => {
                staged[index] = StagedChange::update(change.schema, change.key, change.row);
            }
            (ChangeKind::Delete, ChangeKind::Update) => {
                return Err(AppError::conflict(format!(
                    "Row {} of '{}' is already staged for deletion",
                    change.key, change.schema.name
                )));
            }
        }
        Ok(())
    }

    /// Drop a staged update of one row. Inserts and deletes stay staged.
    pub fn unstage_update(&self, table: &str, key: Uuid) {
        self.staged
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|c| !(c.kind == ChangeKind::Update && c.targets(table, key)));
    }

    /// Number of staged changes.
    pub fn pending(&self) -> usize {
        self.staged.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Take every staged change in integrity order: inserts, updates, deletes.
    pub fn drain(&self) -> Vec<StagedChange> {
        let mut changes =
            std::mem::take(&mut *self.staged.lock().unwrap_or_else(|e| e.into_inner()));
        changes.sort_by_key(|c| c.kind);
        changes
    }

    /// Drop every staged change.
    pub fn discard(&self) {
        self.staged.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Remember the loaded state of a row read with change tracking.
    pub fn track(&self, table: &'static str, key: Uuid, row: Value) {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((table, key), row);
    }

    /// Whether `row` is identical to the tracked snapshot of the same row.
    pub fn is_unchanged(&self, table: &'static str, key: Uuid, row: &Value) -> bool {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(table, key))
            .is_some_and(|snapshot| snapshot == row)
    }

    /// Bring tracked snapshots in line with a committed batch.
    pub fn accept(&self, committed: &[StagedChange]) {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        for change in committed {
            let key = (change.schema.name, change.key);
            match change.kind {
                ChangeKind::Delete => {
                    snapshots.remove(&key);
                }
                ChangeKind::Insert | ChangeKind::Update => {
                    if let Some(snapshot) = snapshots.get_mut(&key) {
                        *snapshot = change.row.clone();
                    }
                }
            }
        }
    }
}

/// A per-scope handle onto a backing store.
///
/// Reads go straight to the store; writes are staged on the
/// [`ChangeTracker`] and reach the store only through [`StoreSession::apply`],
/// which must apply the whole batch or nothing.
#[async_trait]
pub trait StoreSession: Send + Sync + Debug {
    /// Load one row by primary key.
    async fn find(&self, schema: &TableSchema, key: Uuid) -> AppResult<Option<Value>>;

    /// Count rows matching the query, ignoring any window.
    async fn count(&self, query: QuerySpec<'_>) -> AppResult<u64>;

    /// Fetch matching rows, optionally reduced to `projection` columns and
    /// limited to `window`.
    async fn fetch(
        &self,
        query: QuerySpec<'_>,
        projection: Option<&[&'static str]>,
        window: Option<Window>,
    ) -> AppResult<Vec<Value>>;

    /// Apply a batch of changes atomically.
    async fn apply(&self, changes: &[StagedChange]) -> AppResult<()>;

    /// The session's change tracker.
    fn tracker(&self) -> &ChangeTracker;
}

/// A store backend that hands out per-scope sessions.
#[async_trait]
pub trait StoreProvider: Send + Sync + Debug {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Open a session for one logical unit of work.
    fn open_session(&self) -> Arc<dyn StoreSession>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release backend resources. Sessions opened afterwards may fail.
    async fn close(&self) {}
}
