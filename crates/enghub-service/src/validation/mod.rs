//! Model validation.

pub mod registry;
pub mod rules;

pub use registry::{DeriveValidator, ModelValidator, ValidatorRegistry};
