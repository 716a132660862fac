//! Remote Document Store
//!
//! Port for the hosted document database plus an in-memory adapter.
//!
//! Documents are schemaless JSON objects grouped into named collections and
//! addressed by string id. Typed mapping and validation happen in the
//! repositories that consume this port, never here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::storage::{StorageError, read_json_or_default, write_json_atomic};

/// A single stored document
pub type Document = Map<String, Value>;

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    /// `update_record` on a document that does not exist
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// Backend could not be reached or refused the operation
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// Local snapshot of the store could not be written
    #[error("Document store snapshot failed: {0}")]
    Snapshot(#[from] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Port
// ============================================================================

/// Remote document store trait
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    /// Fetch one document, `None` when absent
    async fn get_record(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Create or fully replace a document
    async fn set_record(&self, collection: &str, id: &str, document: Document) -> StoreResult<()>;

    /// Overwrite the given top-level fields of an existing document
    async fn update_record(&self, collection: &str, id: &str, fields: Document)
    -> StoreResult<()>;

    /// All documents of a collection as `(id, document)` pairs
    async fn list_records(&self, collection: &str) -> StoreResult<Vec<(String, Document)>>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory document store
///
/// Optionally snapshotted to a JSON file after every write, which lets the
/// CLI keep "remote" state between runs. Every call through the port is
/// counted so callers can assert the store was never contacted.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
    snapshot: Option<PathBuf>,
    calls: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path` (empty if missing) and snapshot there on writes
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let collections: Collections = read_json_or_default(&path)?;

        tracing::debug!(
            path = %path.display(),
            collections = collections.len(),
            "Document store loaded"
        );

        Ok(Self {
            collections: RwLock::new(collections),
            snapshot: Some(path),
            calls: AtomicU64::new(0),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Number of port operations served so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection, without counting as a call
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Apply `f` and snapshot the result; memory changes only once the snapshot is written
    fn mutate<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Collections) -> StoreResult<()>,
    {
        let mut collections = self.collections.write();
        match &self.snapshot {
            Some(path) => {
                let mut next = collections.clone();
                f(&mut next)?;
                write_json_atomic(path, &next)?;
                *collections = next;
            }
            None => f(&mut collections)?,
        }
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get_record(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.touch();
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set_record(&self, collection: &str, id: &str, document: Document) -> StoreResult<()> {
        self.touch();
        self.mutate(|collections| {
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), document);
            Ok(())
        })
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> StoreResult<()> {
        self.touch();
        self.mutate(|collections| {
            let document = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;

            document.extend(fields);
            Ok(())
        })
    }

    async fn list_records(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        self.touch();
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
