//! Filter types for dynamic query building.
//!
//! A [`Filter`] is a conjunction of [`FilterField`] conditions. It is a
//! plain data description, so every store can evaluate it natively: the
//! PostgreSQL store renders it to a `WHERE` clause and the in-memory store
//! evaluates it row by row.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL `LIKE` pattern match.
    Like,
    /// SQL `ILIKE` case-insensitive pattern match.
    ILike,
    /// SQL `IN` list membership.
    In,
    /// SQL `IS NULL` check.
    IsNull,
    /// SQL `IS NOT NULL` check.
    IsNotNull,
}

impl FilterOp {
    /// Return the SQL operator for binary comparisons.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::In => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// A dynamic filter value that can represent various SQL types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A string value (also used for UUID columns).
    String(String),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A list of string values (for `IN` operator).
    StringList(Vec<String>),
    /// Null / no value (for `IS NULL`, `IS NOT NULL`).
    Null,
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::String(value.to_string())
    }
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The column or field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Eq, value.into())
    }

    /// Shorthand for a case-insensitive LIKE filter.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterOp::ILike, FilterValue::String(pattern.into()))
    }

    /// Shorthand for an `IN` list filter.
    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            field,
            FilterOp::In,
            FilterValue::StringList(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Shorthand for an `IS NULL` filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IsNull, FilterValue::Null)
    }
}

/// A conjunction of filter conditions. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Conditions that must all hold.
    pub fields: Vec<FilterField>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter with a single condition.
    pub fn from_field(field: FilterField) -> Self {
        Self {
            fields: vec![field],
        }
    }

    /// Add a condition.
    pub fn and(mut self, field: FilterField) -> Self {
        self.fields.push(field);
        self
    }

    /// Whether the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over the referenced field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.as_str())
    }
}

impl From<FilterField> for Filter {
    fn from(field: FilterField) -> Self {
        Self::from_field(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chains_conditions() {
        let filter = Filter::from_field(FilterField::eq("name", "Ali"))
            .and(FilterField::ilike("name_ar", "%ع%"))
            .and(FilterField::is_null("deleted"));
        assert_eq!(filter.fields.len(), 3);
        assert_eq!(
            filter.field_names().collect::<Vec<_>>(),
            vec!["name", "name_ar", "deleted"]
        );
    }

    #[test]
    fn test_uuid_values_become_strings() {
        let id = Uuid::new_v4();
        let field = FilterField::eq("id", id);
        assert_eq!(field.value, FilterValue::String(id.to_string()));
    }

    #[test]
    fn test_filter_value_deserializes_untagged() {
        let values: Vec<FilterValue> =
            serde_json::from_str(r#"["x", 3, true, ["a", "b"], null]"#).expect("deserialize");
        assert_eq!(values[0], FilterValue::String("x".into()));
        assert_eq!(values[1], FilterValue::Integer(3));
        assert_eq!(values[2], FilterValue::Boolean(true));
        assert_eq!(
            values[3],
            FilterValue::StringList(vec!["a".into(), "b".into()])
        );
        assert_eq!(values[4], FilterValue::Null);
    }
}
