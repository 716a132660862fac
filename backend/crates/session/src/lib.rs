//! Session Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and provider traits
//! - `application/` - Use cases, session state and the manager facade
//! - `infra/` - Document store repositories, embedded identity provider
//!
//! ## Features
//! - Sign-up with administrator approval before the first sign-in
//! - Username + password sign-in through an external identity provider
//! - Administrator sign-in from configured credentials, local only
//! - Local cache mirror of the identity and its data snapshot
//! - Session restoration on provider session changes
//!
//! ## Consistency Model
//! - One state transition at a time (single-flight gate)
//! - An unapproved account never keeps a remote session
//! - Administrator data never reaches the remote store

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::SessionConfig;
pub use application::manager::SessionManager;
pub use error::{SessionError, SessionResult};
pub use infra::document::DocumentRepository;
pub use infra::memory_provider::{MemoryIdentityProvider, MemoryProviderConfig};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}
