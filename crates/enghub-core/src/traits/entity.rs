//! Entity contract and table metadata.

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 128-bit UUID.
    Uuid,
    /// Variable-length text.
    Text,
    /// Boolean flag.
    Boolean,
    /// 64-bit integer.
    Integer,
}

impl ColumnType {
    /// PostgreSQL type name used for casts.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "bigint",
        }
    }
}

/// A persisted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name; also the serialized field name of the entity.
    pub name: &'static str,
    /// Storage type.
    pub column_type: ColumnType,
    /// Whether `NULL` is accepted.
    pub nullable: bool,
    /// Maximum length in characters for text columns.
    pub max_length: Option<usize>,
}

impl Column {
    /// A required column without a length limit.
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
            max_length: None,
        }
    }

    /// A required text column limited to `max_length` characters.
    pub const fn text(name: &'static str, max_length: usize) -> Self {
        Self {
            name,
            column_type: ColumnType::Text,
            nullable: false,
            max_length: Some(max_length),
        }
    }
}

/// Table name, key column and columns of an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table (or collection) name.
    pub name: &'static str,
    /// Primary key column name.
    pub key: &'static str,
    /// All persisted columns, key included.
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with `InvalidArgument` when unknown.
    pub fn require_column(&self, name: &str) -> AppResult<&'static Column> {
        self.column(name).ok_or_else(|| {
            AppError::invalid_argument(format!(
                "Unknown field '{name}' for '{}'",
                self.name
            ))
        })
    }
}

/// An identity-bearing persisted record.
///
/// The serialized form of an entity must use the column names of
/// [`Entity::SCHEMA`] as its field names; stores move rows as JSON objects.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table metadata for this entity type.
    const SCHEMA: TableSchema;

    /// Immutable unique identifier.
    fn id(&self) -> Uuid;

    /// Soft-delete capability of this type.
    ///
    /// Types supporting soft deletion return `Some(self)`; the default is
    /// `None`, meaning deletes physically remove the record.
    fn as_soft_deletable(&mut self) -> Option<&mut dyn SoftDeletable> {
        None
    }
}

/// Capability for records that are flagged instead of removed on delete.
pub trait SoftDeletable {
    /// Whether the record has been soft-deleted.
    fn is_deleted(&self) -> bool;

    /// Flag the record as deleted.
    fn mark_deleted(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const COLUMNS: &[Column] = &[
        Column::required("id", ColumnType::Uuid),
        Column::text("name", 100),
    ];
    const SCHEMA: TableSchema = TableSchema {
        name: "widgets",
        key: "id",
        columns: COLUMNS,
    };

    #[test]
    fn test_column_lookup() {
        assert_eq!(SCHEMA.column("name").and_then(|c| c.max_length), Some(100));
        assert!(SCHEMA.column("missing").is_none());
    }

    #[test]
    fn test_require_unknown_column_is_invalid_argument() {
        let err = SCHEMA.require_column("colour").expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.message, "Unknown field 'colour' for 'widgets'");
    }
}
