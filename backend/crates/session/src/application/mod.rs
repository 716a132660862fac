//! Application Layer
//!
//! Use cases and application services.

pub mod admin;
pub mod bootstrap;
pub mod config;
pub mod manager;
pub mod restore_session;
pub mod route_guard;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod state;
pub mod update_username;
pub mod user_data;

// Re-exports
pub use admin::AdminUseCase;
pub use bootstrap::BootstrapAdminUseCase;
pub use config::{AdminCredentials, CacheKeys, SessionConfig};
pub use manager::SessionManager;
pub use restore_session::{RestoreOutcome, RestoreSessionUseCase};
pub use route_guard::{Route, RouteDecision};
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use state::SessionState;
pub use update_username::UpdateUsernameUseCase;
pub use user_data::UserDataUseCase;
