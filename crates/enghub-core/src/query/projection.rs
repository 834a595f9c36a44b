//! Declarative projections of entity rows.

use serde::de::DeserializeOwned;

use crate::traits::entity::Entity;

/// A reduced view of `T` made of a fixed subset of its columns.
///
/// The column list is pushed down to the store, which returns only those
/// columns; the result rows are then deserialized into `Self`. Field names
/// of the implementing type must match the listed column names (serde
/// renames are fine as long as deserialization accepts the column name).
pub trait Projection<T: Entity>: DeserializeOwned + Send + 'static {
    /// Columns of `T::SCHEMA` selected by this projection.
    const COLUMNS: &'static [&'static str];
}
