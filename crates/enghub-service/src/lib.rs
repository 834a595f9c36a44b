//! # enghub-service
//!
//! Application services for EngHub. Each service is built per request
//! scope over one store session and validates its input through the
//! [`ValidatorRegistry`] before anything is staged.

pub mod engineer;
pub mod validation;

pub use engineer::{CreateEngineerDto, EngineerDto, EngineerSearch, EngineerService};
pub use validation::ValidatorRegistry;
