/// Partial update engine
///
/// One generic operation updates any entity kind:
///
/// ```text
/// patch ──validate_partial──▶ ValidatedPatch ──assignments()──▶ find_and_update_one
///         (field table)        (_id removed,      (null / "" dropped)   (single write)
///                               sentinels explicit)
/// ```
///
/// Validation failures never reach the store. Valid patches cost exactly one
/// store write, even when nothing is left to assign; the store then reports
/// `modifiedCount: 0`. Store failures are surfaced as-is and never retried here.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use std::sync::Arc;
/// use taskboard_shared::engine::PartialUpdateEngine;
/// use taskboard_shared::models::EntityKind;
/// use taskboard_shared::store::{memory::InMemoryDocumentStore, DocumentStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(InMemoryDocumentStore::new());
/// let engine = PartialUpdateEngine::new(store.clone());
///
/// let id = store
///     .insert_one("tasks", json!({ "title": "Draft", "status": "todo" }).as_object().unwrap().clone())
///     .await?
///     .inserted_id;
///
/// let result = engine
///     .update_partial(EntityKind::Task, &json!({ "_id": id.to_string(), "status": "done" }))
///     .await?;
/// assert_eq!(result.modified_count, 1);
/// # Ok(())
/// # }
/// ```

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::EntityKind;
use crate::patch::{validate_partial, FieldViolation, PatchError, ValidatedPatch};
use crate::store::{DocumentStore, StoreError, UpdateResult};

/// Partial update errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The patch violates its entity's field constraints
    #[error("validation failed: {} invalid field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// The identifier is not a valid identifier encoding
    #[error("malformed identifier: {0:?}")]
    MalformedIdentifier(String),

    /// The store could not be reached
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store failed the write for a non-availability reason
    #[error("document store error: {0}")]
    Store(String),
}

impl From<PatchError> for EngineError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::Validation(violations) => EngineError::Validation(violations),
            PatchError::MalformedIdentifier(raw) => EngineError::MalformedIdentifier(raw),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => EngineError::StoreUnavailable(msg),
            StoreError::Backend(msg) => EngineError::Store(msg),
        }
    }
}

/// Applies sparse patches to documents of any entity kind
#[derive(Clone)]
pub struct PartialUpdateEngine {
    store: Arc<dyn DocumentStore>,
}

impl PartialUpdateEngine {
    /// Creates an engine writing through `store`
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validates `patch` against `kind` and applies it
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] / [`EngineError::MalformedIdentifier`]
    ///   before any store interaction
    /// - [`EngineError::StoreUnavailable`] / [`EngineError::Store`] when the
    ///   single write fails
    pub async fn update_partial(
        &self,
        kind: EntityKind,
        patch: &Value,
    ) -> Result<UpdateResult, EngineError> {
        let validated = validate_partial(kind, patch).map_err(|err| {
            debug!(%kind, error = %err, "Rejected patch");
            err
        })?;

        self.apply(validated).await
    }

    /// Applies an already validated patch with one store write
    pub async fn apply(&self, patch: ValidatedPatch) -> Result<UpdateResult, EngineError> {
        let kind = patch.kind();
        let id = patch.id();
        let assignments = patch.assignments();

        debug!(
            %kind,
            %id,
            fields = ?assignments.keys().collect::<Vec<_>>(),
            skipped = patch.fields().len() - assignments.len(),
            noop = patch.is_noop(),
            "Applying partial update"
        );

        let result = self
            .store
            .find_and_update_one(kind.collection(), id, assignments)
            .await?;

        info!(
            %kind,
            %id,
            modified_count = result.modified_count,
            "Partial update applied"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, DocumentId, ID_FIELD};
    use crate::store::memory::InMemoryDocumentStore;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    async fn setup(collection: &str, body: Value) -> (Arc<InMemoryDocumentStore>, PartialUpdateEngine, DocumentId) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let engine = PartialUpdateEngine::new(store.clone());
        let id = store.insert_one(collection, doc(body)).await.unwrap().inserted_id;
        (store, engine, id)
    }

    #[tokio::test]
    async fn test_empty_name_is_left_unchanged() {
        let (store, engine, id) = setup(
            "users",
            json!({ "name": "Ann", "email": "ann@x.com", "role": "backend" }),
        )
        .await;

        let result = engine
            .update_partial(
                EntityKind::User,
                &json!({ "_id": id.to_string(), "name": "", "email": "ann2@x.com", "role": "backend" }),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            UpdateResult {
                acknowledged: true,
                modified_count: 1
            }
        );

        let stored = store.find_one("users", id).await.unwrap().unwrap();
        assert_eq!(
            Value::Object(stored),
            json!({ "_id": id.to_string(), "name": "Ann", "email": "ann2@x.com", "role": "backend" })
        );
    }

    #[tokio::test]
    async fn test_only_present_fields_change() {
        let original = json!({
            "title": "Draft",
            "description": "First pass",
            "projectId": "p1",
            "assignedTo": "u1",
            "status": "todo",
            "priority": "low",
            "deadline": "2025-01-01"
        });
        let (store, engine, id) = setup("tasks", original.clone()).await;

        engine
            .update_partial(
                EntityKind::Task,
                &json!({
                    "_id": id.to_string(),
                    "status": "in-progress",
                    "priority": null,
                    "assignedTo": "u2",
                    "description": ""
                }),
            )
            .await
            .unwrap();

        let stored = store.find_one("tasks", id).await.unwrap().unwrap();
        for (field, before) in original.as_object().unwrap() {
            let expected = match field.as_str() {
                "status" => json!("in-progress"),
                "assignedTo" => json!("u2"),
                _ => before.clone(),
            };
            assert_eq!(stored[field], expected, "field {field}");
        }
    }

    #[tokio::test]
    async fn test_identifier_only_patch_writes_once_and_modifies_nothing() {
        let (store, engine, id) = setup("projects", json!({ "name": "Apollo" })).await;
        let writes_before = store.write_count();

        let result = engine
            .update_partial(
                EntityKind::Project,
                &json!({ "_id": id.to_string(), "name": null, "deadline": "" }),
            )
            .await
            .unwrap();

        assert_eq!(result.modified_count, 0);
        assert!(result.acknowledged);
        assert_eq!(store.write_count(), writes_before + 1);
        assert_eq!(
            store.find_one("projects", id).await.unwrap().unwrap()["name"],
            "Apollo"
        );
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_an_error() {
        let (_store, engine, _id) = setup("comments", json!({ "content": "hi" })).await;

        let result = engine
            .update_partial(
                EntityKind::Comment,
                &json!({ "_id": DocumentId::new().to_string(), "content": "edited" }),
            )
            .await
            .unwrap();

        assert!(result.acknowledged);
        assert_eq!(result.modified_count, 0);
    }

    #[tokio::test]
    async fn test_invalid_enum_never_reaches_store() {
        let (store, engine, id) = setup("tasks", json!({ "status": "todo" })).await;
        let writes_before = store.write_count();

        let err = engine
            .update_partial(
                EntityKind::Task,
                &json!({ "_id": id.to_string(), "status": "archived" }),
            )
            .await
            .unwrap_err();

        match err {
            EngineError::Validation(violations) => assert_eq!(violations[0].field, "status"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn test_malformed_identifier_never_reaches_store() {
        let (store, engine, _id) = setup("users", json!({ "name": "Ann" })).await;
        let writes_before = store.write_count();

        let err = engine
            .update_partial(EntityKind::User, &json!({ "_id": "u1", "name": "Bo" }))
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::MalformedIdentifier("u1".to_string()));
        assert_eq!(store.write_count(), writes_before);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_surfaced() {
        let (store, engine, id) = setup("users", json!({ "name": "Ann" })).await;
        store.set_available(false);

        let err = engine
            .update_partial(EntityKind::User, &json!({ "_id": id.to_string(), "name": "Bo" }))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_comment_created_at_survives_updates() {
        let (store, engine, id) = setup(
            "comments",
            json!({ "taskId": "t1", "authorId": "u1", "content": "hi", "createdAt": "2024-03-01T12:30:00.000Z" }),
        )
        .await;

        let err = engine
            .update_partial(
                EntityKind::Comment,
                &json!({ "_id": id.to_string(), "createdAt": "1999-01-01T00:00:00.000Z" }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        engine
            .update_partial(
                EntityKind::Comment,
                &json!({ "_id": id.to_string(), "content": "edited", "createdAt": null }),
            )
            .await
            .unwrap();

        let stored = store.find_one("comments", id).await.unwrap().unwrap();
        assert_eq!(stored["createdAt"], "2024-03-01T12:30:00.000Z");
        assert_eq!(stored["content"], "edited");
        assert_eq!(stored[ID_FIELD], json!(id.to_string()));
    }
}
