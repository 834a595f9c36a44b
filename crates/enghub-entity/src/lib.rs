//! # enghub-entity
//!
//! Domain entity models for EngHub. Every persisted struct implements
//! [`enghub_core::traits::Entity`] and serializes with its column names,
//! which is how the store providers move rows.

pub mod engineer;

pub use engineer::Engineer;
