//! Core type definitions used across the EngHub workspace.

pub mod envelope;
pub mod filter;
pub mod id;
pub mod pagination;
pub mod sorting;
pub mod validation;

pub use envelope::{CustomError, Envelope, LookupDto};
pub use filter::{Filter, FilterField, FilterOp, FilterValue};
pub use id::*;
pub use pagination::{Page, PageRequest};
pub use sorting::{SortDirection, SortField};
pub use validation::FieldErrors;
