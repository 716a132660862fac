//! Infrastructure Layer
//!
//! Repository and identity provider implementations.

pub mod document;
pub mod memory_provider;
