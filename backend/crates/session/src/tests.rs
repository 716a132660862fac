//! Scenario tests for the session crate
//! In-memory provider, store and cache wired through the manager

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use kernel::id::CategoryId;
use ledger::{Category, NewGoal, Transaction, TransactionType, UserData, UserDataPatch};
use platform::document::{Document, DocumentStore, MemoryDocumentStore};
use platform::storage::{KeyValueStore, MemoryKeyValueStore};
use rust_decimal::Decimal;

use crate::application::config::SessionConfig;
use crate::application::manager::SessionManager;
use crate::application::restore_session::RestoreOutcome;
use crate::application::route_guard::{Route, RouteDecision};
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::SessionError;
use crate::infra::document::DocumentRepository;
use crate::infra::memory_provider::{MemoryIdentityProvider, MemoryProviderConfig};

type Manager = SessionManager<MemoryIdentityProvider, DocumentRepository<MemoryDocumentStore>>;

struct Harness {
    manager: Arc<Manager>,
    provider: Arc<MemoryIdentityProvider>,
    store: Arc<MemoryDocumentStore>,
    cache: Arc<MemoryKeyValueStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(SessionConfig::development())
    }

    fn with_config(config: SessionConfig) -> Self {
        let provider = Arc::new(MemoryIdentityProvider::new(MemoryProviderConfig::fast()));
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryKeyValueStore::new());
        let manager = SessionManager::init(
            provider.clone(),
            Arc::new(DocumentRepository::new(store.clone())),
            cache.clone(),
            config,
        )
        .unwrap();

        Self {
            manager: Arc::new(manager),
            provider,
            store,
            cache,
        }
    }

    /// A second manager over the same provider, store and cache
    fn reopen(&self) -> Manager {
        SessionManager::init(
            self.provider.clone(),
            Arc::new(DocumentRepository::new(self.store.clone())),
            self.cache.clone(),
            self.manager.config().clone(),
        )
        .unwrap()
    }

    async fn approve(&self, uid: &UserId) {
        let mut fields = Document::new();
        fields.insert("isApproved".to_string(), true.into());
        self.store
            .update_record("users", uid.as_str(), fields)
            .await
            .unwrap();
    }

    /// Sign up and approve, leaving the client anonymous
    async fn approved_member(&self, username: &str, password: &str) -> UserId {
        let uid = self.manager.sign_up(username, password).await.unwrap();
        self.approve(&uid).await;
        uid
    }

    fn cached(&self, key: &str) -> Option<String> {
        self.cache.get(key).unwrap()
    }

    fn cached_user_data(&self) -> Option<UserData> {
        self.cached("jf_user_data")
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

fn email(name: &str) -> Email {
    Email::derive(&UserName::new(name).unwrap(), "user.com")
}

fn salary() -> Transaction {
    Transaction::new(
        "Salary",
        Decimal::new(150_000, 2),
        CategoryId::new("work"),
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        TransactionType::Income,
    )
}

mod sign_up_tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_creates_pending_account() {
        let h = Harness::new();
        let uid = h.manager.sign_up("alice", "pw1").await.unwrap();

        let record = h.store.get_record("users", uid.as_str()).await.unwrap().unwrap();
        assert_eq!(record["username"], "alice");
        assert_eq!(record["isAdmin"], false);
        assert_eq!(record["isApproved"], false);
        assert!(record["createdAt"].is_string());

        let data = h.store.get_record("userData", uid.as_str()).await.unwrap().unwrap();
        assert_eq!(
            serde_json::Value::Object(data),
            serde_json::json!({"transactions": [], "categories": []})
        );
    }

    #[tokio::test]
    async fn test_sign_up_does_not_sign_in() {
        let h = Harness::new();
        h.manager.sign_up("alice", "pw1").await.unwrap();

        assert_eq!(h.manager.current_identity().await, None);
        assert_eq!(h.provider.current_session().await, None);
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_user_name() {
        let h = Harness::new();
        h.manager.sign_up("bob", "pw").await.unwrap();

        let err = h.manager.sign_up("bob", "otherPw").await.unwrap_err();
        assert!(matches!(err, SessionError::UsernameTaken));

        let err = h.manager.sign_up("BOB", "otherPw").await.unwrap_err();
        assert!(matches!(err, SessionError::UsernameTaken));

        assert_eq!(h.store.count("users"), 1);
    }

    #[tokio::test]
    async fn test_provider_email_in_use_is_taken() {
        let h = Harness::new();
        // Credential exists without an account record
        h.provider.create_account(&email("carol"), "pw").await.unwrap();
        h.provider.end_session().await.unwrap();

        let err = h.manager.sign_up("carol", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_admin_name_is_reserved() {
        let h = Harness::new();
        let err = h.manager.sign_up("januzzi", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_invalid_user_name() {
        let h = Harness::new();
        let err = h.manager.sign_up("bad name", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidUserName(_)));
        assert_eq!(h.provider.account_count(), 0);
    }
}

mod sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_then_approved() {
        let h = Harness::new();
        let uid = h.manager.sign_up("alice", "pw1").await.unwrap();

        let err = h.manager.sign_in("alice", "pw1", false).await.unwrap_err();
        assert!(matches!(err, SessionError::PendingApproval));
        assert_eq!(h.provider.current_session().await, None);
        assert_eq!(h.manager.current_identity().await, None);

        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        h.manager.approve_user(&uid).await.unwrap();
        h.manager.sign_out().await.unwrap();

        let identity = h.manager.sign_in("alice", "pw1", false).await.unwrap();
        assert_eq!(identity.uid, uid);
        assert_eq!(identity.username, "alice");
        assert!(identity.is_approved);
        assert!(!identity.is_admin);
        assert_eq!(h.manager.get_user_data().await, Some(UserData::default()));
        assert_eq!(h.provider.current_session().await.map(|s| s.uid), Some(uid));
    }

    #[tokio::test]
    async fn test_sign_in_is_case_insensitive_on_name() {
        let h = Harness::new();
        h.approved_member("Alice", "pw1").await;

        let identity = h.manager.sign_in("alice", "pw1", false).await.unwrap();
        assert_eq!(identity.username, "Alice");
    }

    #[tokio::test]
    async fn test_sign_in_writes_cache() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let cached = h.cached("jf_user").unwrap();
        assert!(cached.contains("\"username\":\"alice\""));
        assert_eq!(h.cached_user_data(), Some(UserData::default()));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;

        let err = h.manager.sign_in("alice", "nope", false).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));

        let err = h.manager.sign_in("nobody", "pw1", false).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_repeated_failures_are_rate_limited() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;

        for _ in 0..5 {
            let err = h.manager.sign_in("alice", "nope", false).await.unwrap_err();
            assert!(matches!(err, SessionError::InvalidCredentials));
        }

        let err = h.manager.sign_in("alice", "pw1", false).await.unwrap_err();
        assert!(matches!(err, SessionError::RateLimited));
        assert_eq!(
            err.to_app_error().kind(),
            kernel::error::kind::ErrorKind::TooManyRequests
        );
    }

    #[tokio::test]
    async fn test_missing_account_record() {
        let h = Harness::new();
        h.provider.create_account(&email("ghost"), "pw").await.unwrap();
        h.provider.end_session().await.unwrap();

        let err = h.manager.sign_in("ghost", "pw", false).await.unwrap_err();
        assert!(matches!(err, SessionError::UserNotFound));
        assert_eq!(h.provider.current_session().await, None);
        assert_eq!(h.manager.current_identity().await, None);
    }

    #[tokio::test]
    async fn test_empty_snapshot_document_is_malformed() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;
        h.store
            .set_record("userData", uid.as_str(), Document::new())
            .await
            .unwrap();

        // Schema violation, not an empty snapshot
        let err = h.manager.sign_in("alice", "pw1", false).await.unwrap_err();
        assert!(matches!(err, SessionError::MalformedRecord { .. }));
        assert_eq!(h.provider.current_session().await, None);
    }

    #[tokio::test]
    async fn test_absent_snapshot_is_seeded() {
        let h = Harness::new();
        let uid = h.manager.sign_up("alice", "pw1").await.unwrap();
        h.approve(&uid).await;

        let store_without_data = Arc::new(MemoryDocumentStore::new());
        let record = h.store.get_record("users", uid.as_str()).await.unwrap().unwrap();
        store_without_data
            .set_record("users", uid.as_str(), record)
            .await
            .unwrap();

        let manager = SessionManager::init(
            h.provider.clone(),
            Arc::new(DocumentRepository::new(store_without_data.clone())),
            Arc::new(MemoryKeyValueStore::new()),
            SessionConfig::development(),
        )
        .unwrap();

        manager.sign_in("alice", "pw1", false).await.unwrap();
        assert_eq!(manager.get_user_data().await, Some(UserData::default()));
        assert_eq!(store_without_data.count("userData"), 1);
    }
}

mod admin_sign_in_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_sign_in_ignores_remote_state() {
        let h = Harness::new();
        let identity = h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();

        assert!(identity.is_admin);
        assert!(identity.is_approved);
        assert_eq!(identity.uid.as_str(), "admin");
        assert_eq!(h.store.calls(), 0);
        assert_eq!(h.provider.current_session().await, None);
        assert_eq!(h.cached_user_data(), Some(UserData::default()));
    }

    #[tokio::test]
    async fn test_admin_sign_in_ends_member_session() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        assert_eq!(h.provider.current_session().await, None);

        h.manager.sign_out().await.unwrap();

        let reopened = h.reopen();
        assert_eq!(
            reopened.restore_session().await.unwrap(),
            RestoreOutcome::NoSession
        );
        assert_eq!(reopened.current_identity().await, None);
    }

    #[tokio::test]
    async fn test_admin_wrong_password() {
        let h = Harness::new();
        let err = h.manager.sign_in("januzzi", "wrong", true).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert_eq!(h.manager.current_identity().await, None);
    }

    #[tokio::test]
    async fn test_admin_sign_in_without_configured_admin() {
        let h = Harness::with_config(SessionConfig::default());
        let err = h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_admin_data_stays_local() {
        let h = Harness::new();
        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        let calls = h.store.calls();

        let t1 = salary();
        h.manager
            .update_user_data(UserDataPatch::transactions(vec![t1.clone()]))
            .await
            .unwrap();

        assert_eq!(h.store.calls(), calls);
        assert_eq!(h.cached_user_data().unwrap().transactions, vec![t1]);
    }
}

mod sign_out_tests {
    use super::*;
    use crate::domain::provider::{ProviderError, ProviderResult, ProviderSession};
    use tokio::sync::watch;

    /// Provider whose remote sign-out always fails
    struct StickyProvider {
        inner: MemoryIdentityProvider,
    }

    impl IdentityProvider for StickyProvider {
        async fn authenticate(
            &self,
            email: &Email,
            password: &str,
        ) -> ProviderResult<ProviderSession> {
            self.inner.authenticate(email, password).await
        }

        async fn create_account(
            &self,
            email: &Email,
            password: &str,
        ) -> ProviderResult<ProviderSession> {
            self.inner.create_account(email, password).await
        }

        async fn end_session(&self) -> ProviderResult<()> {
            Err(ProviderError::Unavailable("offline".to_string()))
        }

        async fn current_session(&self) -> Option<ProviderSession> {
            self.inner.current_session().await
        }

        fn subscribe(&self) -> watch::Receiver<Option<ProviderSession>> {
            self.inner.subscribe()
        }
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache_and_returns_login() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let route = h.manager.sign_out().await.unwrap();
        assert_eq!(route, "/login");
        assert_eq!(h.cached("jf_user"), None);
        assert_eq!(h.cached("jf_user_data"), None);
        assert_eq!(h.manager.current_identity().await, None);
        assert_eq!(h.provider.current_session().await, None);
    }

    #[tokio::test]
    async fn test_sign_out_when_anonymous_still_clears_cache() {
        let h = Harness::new();
        h.cache.set("jf_user_data", "stale").unwrap();

        h.manager.sign_out().await.unwrap();
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_admin_sign_out() {
        let h = Harness::new();
        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        h.manager.sign_out().await.unwrap();
        assert_eq!(h.cached("jf_user"), None);
        assert_eq!(h.cached("jf_user_data"), None);
    }

    #[tokio::test]
    async fn test_remote_failure_still_clears_local_state() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = Arc::new(MemoryKeyValueStore::new());
        let provider = Arc::new(StickyProvider {
            inner: MemoryIdentityProvider::new(MemoryProviderConfig::fast()),
        });
        let manager = SessionManager::init(
            provider.clone(),
            Arc::new(DocumentRepository::new(store.clone())),
            cache.clone(),
            SessionConfig::development(),
        )
        .unwrap();

        let uid = manager.sign_up("alice", "pw1").await.unwrap();
        let mut fields = Document::new();
        fields.insert("isApproved".to_string(), true.into());
        store.update_record("users", uid.as_str(), fields).await.unwrap();
        manager.sign_in("alice", "pw1", false).await.unwrap();

        let err = manager.sign_out().await.unwrap_err();
        assert!(matches!(err, SessionError::Provider(ProviderError::Unavailable(_))));
        assert_eq!(manager.current_identity().await, None);
        assert_eq!(cache.get("jf_user").unwrap(), None);
        assert_eq!(cache.get("jf_user_data").unwrap(), None);
    }
}

mod user_data_tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_update_is_noop() {
        let h = Harness::new();
        let result = h
            .manager
            .update_user_data(UserDataPatch::transactions(vec![salary()]))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(h.store.calls(), 0);
        assert!(h.cache.is_empty());
        assert_eq!(h.manager.get_user_data().await, None);
    }

    #[tokio::test]
    async fn test_member_update_is_mirrored() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let food = Category::new("Food", "#d4af37");
        h.manager
            .update_user_data(UserDataPatch::categories(vec![food.clone()]))
            .await
            .unwrap();

        let t1 = salary();
        let merged = h
            .manager
            .update_user_data(UserDataPatch::transactions(vec![t1.clone()]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged.categories, vec![food]);
        assert_eq!(merged.transactions, vec![t1]);
        assert_eq!(h.cached_user_data(), Some(merged.clone()));

        let remote = h.store.get_record("userData", uid.as_str()).await.unwrap().unwrap();
        let remote: UserData = serde_json::from_value(serde_json::Value::Object(remote)).unwrap();
        assert_eq!(remote, merged);
    }

    #[tokio::test]
    async fn test_failed_remote_write_keeps_local_state() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        // Remove the remote snapshot so the partial update has nothing to update
        let other = Arc::new(MemoryDocumentStore::new());
        let record = h.store.get_record("users", uid.as_str()).await.unwrap().unwrap();
        other.set_record("users", uid.as_str(), record).await.unwrap();
        let manager = SessionManager::init(
            h.provider.clone(),
            Arc::new(DocumentRepository::new(other)),
            h.cache.clone(),
            SessionConfig::development(),
        )
        .unwrap();

        let err = manager
            .update_user_data(UserDataPatch::transactions(vec![salary()]))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Store(_)));
        assert_eq!(manager.get_user_data().await, Some(UserData::default()));
        assert_eq!(h.cached_user_data(), Some(UserData::default()));
    }
}

mod update_username_tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_identity() {
        let h = Harness::new();
        let err = h.manager.update_username("neo").await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_admin_cannot_rename() {
        let h = Harness::new();
        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        let err = h.manager.update_username("neo").await.unwrap_err();
        assert!(matches!(err, SessionError::Forbidden));
    }

    #[tokio::test]
    async fn test_taken_by_another_account() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_up("bob", "pw2").await.unwrap();
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let err = h.manager.update_username("Bob").await.unwrap_err();
        assert!(matches!(err, SessionError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_rename_updates_record_and_cache() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        // Same name in a different case belongs to the caller
        h.manager.update_username("Alice").await.unwrap();
        let identity = h.manager.update_username("alicia").await.unwrap();
        assert_eq!(identity.username, "alicia");

        let record = h.store.get_record("users", uid.as_str()).await.unwrap().unwrap();
        assert_eq!(record["username"], "alicia");
        assert!(h.cached("jf_user").unwrap().contains("alicia"));
    }
}

mod restore_tests {
    use super::*;

    #[tokio::test]
    async fn test_no_session() {
        let h = Harness::new();
        assert_eq!(
            h.manager.restore_session().await.unwrap(),
            RestoreOutcome::NoSession
        );
    }

    #[tokio::test]
    async fn test_restores_remote_session() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;
        h.provider.authenticate(&email("alice"), "pw1").await.unwrap();

        let outcome = h.manager.restore_session().await.unwrap();
        assert!(matches!(outcome, RestoreOutcome::Restored(ref identity) if identity.uid == uid));
        assert_eq!(h.manager.get_user_data().await, Some(UserData::default()));

        let calls = h.store.calls();
        assert_eq!(
            h.manager.restore_session().await.unwrap(),
            RestoreOutcome::AlreadyCurrent
        );
        assert_eq!(h.store.calls(), calls);
    }

    #[tokio::test]
    async fn test_admin_is_not_replaced() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        h.provider.authenticate(&email("alice"), "pw1").await.unwrap();

        assert_eq!(
            h.manager.restore_session().await.unwrap(),
            RestoreOutcome::AlreadyCurrent
        );
        assert!(h.manager.current_identity().await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_unapproved_session_is_ended() {
        let h = Harness::new();
        h.manager.sign_up("alice", "pw1").await.unwrap();
        h.provider.authenticate(&email("alice"), "pw1").await.unwrap();

        let err = h.manager.restore_session().await.unwrap_err();
        assert!(matches!(err, SessionError::PendingApproval));
        assert_eq!(h.provider.current_session().await, None);
        assert_eq!(h.manager.current_identity().await, None);
    }

    #[tokio::test]
    async fn test_missing_record_clears_state() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        // Another account signs in remotely, but has no record
        h.provider.create_account(&email("ghost"), "pw").await.unwrap();

        let err = h.manager.restore_session().await.unwrap_err();
        assert!(matches!(err, SessionError::UserNotFound));
        assert_eq!(h.provider.current_session().await, None);
        assert_eq!(h.manager.current_identity().await, None);
        assert_eq!(h.cached("jf_user"), None);
    }

    #[tokio::test]
    async fn test_listener_follows_provider() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;
        let listener = h.manager.spawn_session_listener();

        h.provider.authenticate(&email("alice"), "pw1").await.unwrap();

        let mut restored = None;
        for _ in 0..100 {
            restored = h.manager.current_identity().await;
            if restored.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(restored.map(|i| i.uid), Some(uid));

        listener.abort();
    }

    #[tokio::test]
    async fn test_concurrent_sign_in_and_restore() {
        let h = Harness::new();
        let uid = h.approved_member("alice", "pw1").await;

        let (signed_in, restored) = tokio::join!(
            h.manager.sign_in("alice", "pw1", false),
            h.manager.restore_session()
        );

        assert_eq!(signed_in.unwrap().uid, uid);
        assert!(restored.is_ok());
        assert_eq!(h.manager.current_identity().await.map(|i| i.uid), Some(uid));
    }
}

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_admin() {
        let h = Harness::new();
        let err = h.manager.get_all_users().await.unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));

        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let err = h.manager.get_all_users().await.unwrap_err();
        assert!(matches!(err, SessionError::Forbidden));
        let err = h.manager.approve_user(&UserId::new("x")).await.unwrap_err();
        assert!(matches!(err, SessionError::Forbidden));
    }

    #[tokio::test]
    async fn test_directory_and_approval() {
        let h = Harness::new();
        let alice = h.manager.sign_up("alice", "pw1").await.unwrap();
        h.manager.sign_up("bob", "pw2").await.unwrap();
        h.manager.sign_up("alfred", "pw3").await.unwrap();
        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();

        h.manager.approve_user(&alice).await.unwrap();

        let stats = h.manager.user_stats().await.unwrap();
        assert_eq!((stats.total, stats.approved, stats.pending), (3, 1, 2));

        let mut found: Vec<String> = h
            .manager
            .search_users("AL")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.record.username)
            .collect();
        found.sort();
        assert_eq!(found, vec!["alfred", "alice"]);

        h.manager.disapprove_user(&alice).await.unwrap();
        let users = h.manager.get_all_users().await.unwrap();
        assert!(users.iter().all(|a| !a.record.is_approved));

        // Caller's own session is untouched
        assert!(h.manager.current_identity().await.unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_approve_unknown_user() {
        let h = Harness::new();
        h.manager.sign_in("januzzi", "januzzi@!", true).await.unwrap();
        let err = h.manager.approve_user(&UserId::new("ghost")).await.unwrap_err();
        assert!(matches!(err, SessionError::UserNotFound));
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let h = Harness::new();
        assert!(h.manager.bootstrap_admin().await.unwrap());
        assert!(!h.manager.bootstrap_admin().await.unwrap());

        let record = h.store.get_record("users", "admin").await.unwrap().unwrap();
        assert_eq!(record["username"], "januzzi");
        assert_eq!(record["isAdmin"], true);
        assert_eq!(record["isApproved"], true);
        assert_eq!(h.store.count("userData"), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_requires_configured_admin() {
        let h = Harness::with_config(SessionConfig::default());
        let err = h.manager.bootstrap_admin().await.unwrap_err();
        assert!(matches!(err, SessionError::AdminNotConfigured));
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_init_restores_cached_identity() {
        let h = Harness::new();
        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let reopened = h.reopen();
        assert_eq!(
            reopened.current_identity().await,
            h.manager.current_identity().await
        );
        assert_eq!(reopened.get_user_data().await, Some(UserData::default()));
    }

    #[tokio::test]
    async fn test_goals_are_per_identity() {
        let h = Harness::new();
        assert!(matches!(
            h.manager.goals().await,
            Err(SessionError::NotAuthenticated)
        ));

        let uid = h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();

        let goals = h.manager.goals().await.unwrap();
        goals
            .create(NewGoal {
                name: "Trip".to_string(),
                target_amount: Decimal::new(1000, 0),
                current_amount: Decimal::ZERO,
                end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            })
            .unwrap();

        assert!(h.cached(&format!("jf_goals:{uid}")).is_some());
        assert_eq!(h.store.count("goals"), 0);
    }

    #[tokio::test]
    async fn test_route_guard() {
        let h = Harness::new();
        assert_eq!(
            h.manager.check_route("/dashboard").await,
            Some(RouteDecision::Redirect(Route::Login))
        );

        h.approved_member("alice", "pw1").await;
        h.manager.sign_in("alice", "pw1", false).await.unwrap();
        assert_eq!(h.manager.check_route("/dashboard").await, Some(RouteDecision::Allow));
        assert_eq!(
            h.manager.check_route("/admin").await,
            Some(RouteDecision::Redirect(Route::Dashboard))
        );
        assert_eq!(h.manager.check_route("/nowhere").await, None);
    }
}
