//! Core traits defined in `enghub-core` and implemented by other crates.

pub mod entity;
pub mod repository;
pub mod store;
pub mod unit_of_work;

pub use entity::{Column, ColumnType, Entity, SoftDeletable, TableSchema};
pub use repository::Repository;
pub use store::{ChangeKind, ChangeTracker, QuerySpec, StagedChange, StoreProvider, StoreSession, Window};
pub use unit_of_work::UnitOfWork;
