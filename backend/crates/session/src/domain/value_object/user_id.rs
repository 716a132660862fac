//! User ID Value Object
//!
//! Account uids are issued by the identity provider and double as the
//! document id in both the `users` and `userData` collections.

pub use kernel::id::AccountId as UserId;

/// Fixed uid of the synthetic administrator identity
pub const ADMIN_USER_ID: &str = "admin";

/// Uid of the administrator identity
pub fn admin_user_id() -> UserId {
    UserId::new(ADMIN_USER_ID)
}
