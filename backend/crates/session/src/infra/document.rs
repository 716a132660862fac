//! Document Store Repository Implementation
//!
//! Maps account records and data snapshots onto the `users` and `userData`
//! collections of a [`DocumentStore`]. Schema validation happens here, on
//! every read.

use std::sync::Arc;

use ledger::UserData;
use platform::document::{Document, DocumentStore, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::entity::account::{Account, AccountRecord};
use crate::domain::repository::{AccountRepository, UserDataRepository};
use crate::domain::value_object::{user_id::UserId, user_name::UserName};
use crate::error::{SessionError, SessionResult};

/// Collection holding account records
pub const USERS_COLLECTION: &str = "users";

/// Collection holding data snapshots
pub const USER_DATA_COLLECTION: &str = "userData";

/// Document-store-backed repository
#[derive(Debug)]
pub struct DocumentRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for DocumentRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> DocumentRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

// ============================================================================
// Mapping helpers
// ============================================================================

fn decode<T: DeserializeOwned>(collection: &str, id: &str, document: Document) -> SessionResult<T> {
    serde_json::from_value(Value::Object(document)).map_err(|e| SessionError::MalformedRecord {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(value: &T) -> SessionResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(document) => Ok(document),
        other => Err(SessionError::Internal(format!(
            "record encoded as non-object JSON: {other}"
        ))),
    }
}

fn single_field(name: &str, value: impl Into<Value>) -> Document {
    let mut fields = Document::new();
    fields.insert(name.to_string(), value.into());
    fields
}

/// Missing target documents on partial updates mean the account does not exist
fn user_not_found(err: StoreError) -> SessionError {
    match err {
        StoreError::NotFound { .. } => SessionError::UserNotFound,
        other => SessionError::Store(other),
    }
}

// ============================================================================
// AccountRepository Implementation
// ============================================================================

impl<S: DocumentStore + Sync> AccountRepository for DocumentRepository<S> {
    async fn find_by_id(&self, uid: &UserId) -> SessionResult<Option<AccountRecord>> {
        let document = self
            .store
            .get_record(USERS_COLLECTION, uid.as_str())
            .await?;

        document
            .map(|doc| decode(USERS_COLLECTION, uid.as_str(), doc))
            .transpose()
    }

    async fn create(&self, uid: &UserId, record: &AccountRecord) -> SessionResult<()> {
        let document = encode(record)?;
        self.store
            .set_record(USERS_COLLECTION, uid.as_str(), document)
            .await?;
        Ok(())
    }

    async fn list(&self) -> SessionResult<Vec<Account>> {
        let documents = self.store.list_records(USERS_COLLECTION).await?;

        documents
            .into_iter()
            .map(|(id, doc)| {
                let record = decode(USERS_COLLECTION, &id, doc)?;
                Ok(Account {
                    uid: UserId::new(id),
                    record,
                })
            })
            .collect()
    }

    async fn is_user_name_taken(
        &self,
        user_name: &UserName,
        except: Option<&UserId>,
    ) -> SessionResult<bool> {
        let documents = self.store.list_records(USERS_COLLECTION).await?;

        // Only the name is needed here; one malformed record must not block sign-ups
        let taken = documents.iter().any(|(id, doc)| {
            if except.is_some_and(|uid| uid.as_str() == id) {
                return false;
            }
            match doc.get("username").and_then(Value::as_str) {
                Some(stored) => user_name.matches(stored),
                None => {
                    tracing::warn!(id = %id, "Account record without username");
                    false
                }
            }
        });

        Ok(taken)
    }

    async fn set_user_name(&self, uid: &UserId, user_name: &UserName) -> SessionResult<()> {
        self.store
            .update_record(
                USERS_COLLECTION,
                uid.as_str(),
                single_field("username", user_name.as_str()),
            )
            .await
            .map_err(user_not_found)
    }

    async fn set_approved(&self, uid: &UserId, approved: bool) -> SessionResult<()> {
        self.store
            .update_record(
                USERS_COLLECTION,
                uid.as_str(),
                single_field("isApproved", approved),
            )
            .await
            .map_err(user_not_found)
    }
}

// ============================================================================
// UserDataRepository Implementation
// ============================================================================

impl<S: DocumentStore + Sync> UserDataRepository for DocumentRepository<S> {
    async fn find(&self, uid: &UserId) -> SessionResult<Option<UserData>> {
        let document = self
            .store
            .get_record(USER_DATA_COLLECTION, uid.as_str())
            .await?;

        document
            .map(|doc| decode(USER_DATA_COLLECTION, uid.as_str(), doc))
            .transpose()
    }

    async fn save(&self, uid: &UserId, data: &UserData) -> SessionResult<()> {
        let document = encode(data)?;
        self.store
            .set_record(USER_DATA_COLLECTION, uid.as_str(), document)
            .await?;
        Ok(())
    }

    async fn update(&self, uid: &UserId, data: &UserData) -> SessionResult<()> {
        let document = encode(data)?;
        self.store
            .update_record(USER_DATA_COLLECTION, uid.as_str(), document)
            .await?;
        Ok(())
    }
}
