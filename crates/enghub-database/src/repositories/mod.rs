//! Repository implementations.

pub mod entity;

use enghub_entity::Engineer;

pub use entity::EntityRepository;

/// Repository for [`Engineer`] records.
pub type EngineerRepository = EntityRepository<Engineer>;
