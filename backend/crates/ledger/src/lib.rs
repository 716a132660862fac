//! Ledger - personal finance domain
//!
//! Clean Architecture structure:
//! - `domain/` - Transactions, categories, goals and the per-user data snapshot
//! - `application/` - Goal tracking use case
//!
//! The snapshot ([`UserData`]) is owned by the session crate, which decides
//! where it is persisted. This crate only defines its shape and merge rules.

pub mod application;
pub mod domain;
pub mod error;

pub use application::goals::GoalsUseCase;
pub use domain::{
    category::Category,
    goal::{Goal, GoalUpdate, NewGoal},
    transaction::{Transaction, TransactionType},
    user_data::{Totals, UserData, UserDataPatch},
};
pub use error::{LedgerError, LedgerResult};
