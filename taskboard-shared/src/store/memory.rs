/// In-memory document store
///
/// Keeps each collection as an insertion-ordered vector behind a Tokio
/// `RwLock`. Used by the test suites and by `STORE_BACKEND=memory` for local
/// development; contents are lost on restart.
///
/// Two knobs exist for tests:
/// - [`InMemoryDocumentStore::set_available`] makes every call fail with
///   [`StoreError::Unavailable`]
/// - [`InMemoryDocumentStore::write_count`] counts write calls that reached the
///   store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::{with_id, DeleteResult, DocumentStore, InsertResult, StoreError, StoreResult, UpdateResult};
use crate::models::{Document, DocumentId, ID_FIELD};

/// Document store kept in process memory, with an offline switch for tests
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<(DocumentId, Document)>>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) connectivity
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    /// Number of insert, update and delete calls served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_one(&self, collection: &str, mut body: Document) -> StoreResult<InsertResult> {
        self.ensure_available()?;
        self.record_write();

        body.remove(ID_FIELD);
        let id = DocumentId::new();

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push((id, body));

        debug!(collection, %id, "Inserted document");
        Ok(InsertResult {
            inserted_id: id,
            acknowledged: true,
        })
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.ensure_available()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, body)| with_id(*id, body.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>> {
        self.ensure_available()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|(doc_id, _)| *doc_id == id))
            .map(|(doc_id, body)| with_id(*doc_id, body.clone())))
    }

    async fn find_and_update_one(
        &self,
        collection: &str,
        id: DocumentId,
        assignments: Document,
    ) -> StoreResult<UpdateResult> {
        self.ensure_available()?;
        self.record_write();

        let mut collections = self.collections.write().await;
        let Some(body) = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|(doc_id, _)| *doc_id == id))
            .map(|(_, body)| body)
        else {
            return Ok(UpdateResult {
                acknowledged: true,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (field, value) in assignments {
            if field == ID_FIELD {
                continue;
            }
            if body.get(&field) != Some(&value) {
                body.insert(field, value);
                modified = true;
            }
        }

        Ok(UpdateResult {
            acknowledged: true,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(&self, collection: &str, id: DocumentId) -> StoreResult<DeleteResult> {
        self.ensure_available()?;
        self.record_write();

        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(collection) {
            Some(documents) => {
                let before = documents.len();
                documents.retain(|(doc_id, _)| *doc_id != id);
                (before - documents.len()) as u64
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_available()
    }
}
