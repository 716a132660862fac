//! Domain Entities

pub mod account;
pub mod identity;

pub use account::{Account, AccountRecord, UserStats};
pub use identity::Identity;
