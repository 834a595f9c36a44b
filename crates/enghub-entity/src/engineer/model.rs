//! Engineer entity model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use enghub_core::query::Projection;
use enghub_core::traits::{Column, ColumnType, Entity, TableSchema};
use enghub_core::types::{EngineerId, LookupDto};

/// Maximum length of both engineer name columns, in characters.
pub const NAME_MAX_LENGTH: usize = 100;

const COLUMNS: &[Column] = &[
    Column::required("id", ColumnType::Uuid),
    Column::text("name", NAME_MAX_LENGTH),
    Column::text("name_ar", NAME_MAX_LENGTH),
];

/// An engineer with a Latin-script and an Arabic display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engineer {
    /// Unique engineer identifier.
    pub id: EngineerId,
    /// Display name.
    pub name: String,
    /// Localized (Arabic) display name.
    pub name_ar: String,
}

impl Engineer {
    /// Create an engineer with a fresh identifier.
    pub fn new(name: impl Into<String>, name_ar: impl Into<String>) -> Self {
        Self {
            id: EngineerId::new(),
            name: name.into(),
            name_ar: name_ar.into(),
        }
    }
}

impl Entity for Engineer {
    const SCHEMA: TableSchema = TableSchema {
        name: "engineers",
        key: "id",
        columns: COLUMNS,
    };

    fn id(&self) -> Uuid {
        self.id.into_uuid()
    }
}

/// `{ id, name }` pairs for engineer pickers.
impl Projection<Engineer> for LookupDto<Uuid> {
    const COLUMNS: &'static [&'static str] = &["id", "name"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_fields_match_columns() {
        let engineer = Engineer::new("Ali", "علي");
        let row = serde_json::to_value(&engineer).expect("serialize");
        let object = row.as_object().expect("object");
        assert_eq!(object.len(), Engineer::SCHEMA.columns.len());
        for column in Engineer::SCHEMA.columns {
            assert!(object.contains_key(column.name), "missing {}", column.name);
        }
        assert_eq!(row["id"], engineer.id.to_string());
    }

    #[test]
    fn test_engineers_are_hard_deleted() {
        let mut engineer = Engineer::new("Sara", "سارة");
        assert!(engineer.as_soft_deletable().is_none());
    }
}
