/// Document store port
///
/// The API and the partial update engine talk to storage only through the
/// [`DocumentStore`] trait. Two adapters are provided:
///
/// - `postgres`: JSONB documents in a single PostgreSQL table (production)
/// - `memory`: an in-process store for tests and local development
///
/// Every document returned by a read carries its identifier under `_id`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use taskboard_shared::store::{memory::InMemoryDocumentStore, DocumentStore};
///
/// # async fn example() -> Result<(), taskboard_shared::store::StoreError> {
/// let store = InMemoryDocumentStore::new();
///
/// let inserted = store
///     .insert_one("users", json!({ "name": "Ann" }).as_object().unwrap().clone())
///     .await?;
///
/// let updated = store
///     .find_and_update_one("users", inserted.inserted_id, json!({ "name": "Bo" }).as_object().unwrap().clone())
///     .await?;
/// assert_eq!(updated.modified_count, 1);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Document, DocumentId, ID_FIELD};

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached (connection, pool or transport failure)
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but rejected or failed the operation
    #[error("document store error: {0}")]
    Backend(String),
}

/// Classifies sqlx errors into availability and backend failures
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Outcome of an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub inserted_id: DocumentId,
    pub acknowledged: bool,
}

/// Outcome of an update
///
/// `modified_count` is 0 or 1: an identifier addresses at most one document,
/// and a write that leaves the document identical counts as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub modified_count: u64,
}

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Collection-oriented document storage
///
/// Implementations must be safe to share across request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns its generated identifier
    ///
    /// Any `_id` key in `body` is ignored.
    async fn insert_one(&self, collection: &str, body: Document) -> StoreResult<InsertResult>;

    /// Returns every document in the collection, in insertion order
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Returns a single document, if it exists
    async fn find_one(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>>;

    /// Applies `assignments` to the document matched by `id` in one write
    ///
    /// An unknown identifier or an empty assignment set is not an error; both
    /// report `modified_count: 0`.
    async fn find_and_update_one(
        &self,
        collection: &str,
        id: DocumentId,
        assignments: Document,
    ) -> StoreResult<UpdateResult>;

    /// Deletes the document matched by `id`
    async fn delete_one(&self, collection: &str, id: DocumentId) -> StoreResult<DeleteResult>;

    /// Checks that the store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Returns `body` with its identifier set under `_id`
pub(crate) fn with_id(id: DocumentId, mut body: Document) -> Document {
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_results_serialize_in_camel_case() {
        let update = UpdateResult {
            acknowledged: true,
            modified_count: 1,
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({ "acknowledged": true, "modifiedCount": 1 })
        );

        let delete = DeleteResult {
            acknowledged: true,
            deleted_count: 0,
        };
        assert_eq!(
            serde_json::to_value(delete).unwrap(),
            json!({ "acknowledged": true, "deletedCount": 0 })
        );
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn test_with_id_overrides_identifier() {
        let id = DocumentId::new();
        let body = json!({ "_id": "stale", "name": "Ann" }).as_object().unwrap().clone();

        let document = with_id(id, body);
        assert_eq!(document[ID_FIELD], json!(id.to_string()));
        assert_eq!(document["name"], "Ann");
    }
}
