//! # enghub-database
//!
//! Store providers (PostgreSQL and in-memory), the generic entity
//! repository and the unit of work for EngHub.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;
pub mod unit_of_work;

pub use connection::DatabasePool;
pub use repositories::{EngineerRepository, EntityRepository};
pub use store::Database;
pub use unit_of_work::StoreUnitOfWork;
