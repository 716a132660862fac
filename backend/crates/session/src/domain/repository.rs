//! Repository Traits
//!
//! Interfaces for remote persistence. Implementation is in infrastructure layer.

use ledger::UserData;

use crate::domain::entity::account::{Account, AccountRecord};
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::SessionResult;

/// Account record repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Find account record by uid
    async fn find_by_id(&self, uid: &UserId) -> SessionResult<Option<AccountRecord>>;

    /// Create or replace the record for `uid`
    async fn create(&self, uid: &UserId, record: &AccountRecord) -> SessionResult<()>;

    /// Every account record
    async fn list(&self) -> SessionResult<Vec<Account>>;

    /// Check whether any record other than `except` uses the name (case-insensitive)
    async fn is_user_name_taken(
        &self,
        user_name: &UserName,
        except: Option<&UserId>,
    ) -> SessionResult<bool>;

    /// Rename an existing account
    async fn set_user_name(&self, uid: &UserId, user_name: &UserName) -> SessionResult<()>;

    /// Toggle approval of an existing account
    async fn set_approved(&self, uid: &UserId, approved: bool) -> SessionResult<()>;
}

/// Per-user data snapshot repository trait
#[trait_variant::make(UserDataRepository: Send)]
pub trait LocalUserDataRepository {
    /// Find snapshot by uid
    async fn find(&self, uid: &UserId) -> SessionResult<Option<UserData>>;

    /// Create or replace the snapshot
    async fn save(&self, uid: &UserId, data: &UserData) -> SessionResult<()>;

    /// Overwrite an existing snapshot; fails if there is none
    async fn update(&self, uid: &UserId, data: &UserData) -> SessionResult<()>;
}
