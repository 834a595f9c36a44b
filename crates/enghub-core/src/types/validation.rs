//! Field-keyed validation messages.

use std::collections::BTreeMap;

/// Mapping from a property name (e.g. `"NameAR"`) to its failure messages.
///
/// A `BTreeMap` keeps the keys in a stable order for responses and logs.
pub type FieldErrors = BTreeMap<String, Vec<String>>;
