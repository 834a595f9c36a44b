//! Route handlers organized by domain.

pub mod engineer;
pub mod health;
