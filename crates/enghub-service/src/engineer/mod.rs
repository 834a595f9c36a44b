//! Engineer use cases: DTOs, their validators and the service.

pub mod dto;
pub mod service;
pub mod validators;

pub use dto::{CreateEngineerDto, EngineerDto, EngineerSearch};
pub use service::EngineerService;
pub use validators::register_engineer_validators;
