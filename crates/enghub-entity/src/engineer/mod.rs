//! Engineer domain entities.

pub mod model;

pub use model::{Engineer, NAME_MAX_LENGTH};
