//! Domain Layer
//!
//! Core business logic, entities, and repository traits.

pub mod entity;
pub mod provider;
pub mod repository;
pub mod value_object;
