//! # enghub-core
//!
//! Core crate for EngHub. Contains configuration schemas, typed
//! identifiers, filter/sort/pagination types, the entity and store
//! contracts, the query/pagination engine, and the unified error system.
//!
//! This crate has **no** internal dependencies on other EngHub crates.

pub mod cancel;
pub mod config;
pub mod error;
pub mod query;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
