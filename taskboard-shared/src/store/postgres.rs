/// PostgreSQL document store
///
/// All collections share one JSONB table. The identifier lives in its own UUID
/// column and is re-attached as `_id` on read, so it can never be overwritten
/// through the body.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE documents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     seq BIGSERIAL NOT NULL,
///     collection TEXT NOT NULL,
///     body JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::store::{postgres::PgDocumentStore, DocumentStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgDocumentStore::new(pool);
/// let users = store.find_all("users").await?;
/// println!("{} users", users.len());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{with_id, DeleteResult, DocumentStore, InsertResult, StoreError, StoreResult, UpdateResult};
use crate::db::pool;
use crate::models::{Document, DocumentId, ID_FIELD};

/// Document store backed by the PostgreSQL `documents` table
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wraps an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool (for shutdown and migrations)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_document(id: Uuid, body: Value) -> StoreResult<Document> {
    match body {
        Value::Object(map) => Ok(with_id(id.into(), map)),
        other => Err(StoreError::Backend(format!(
            "document {} has a non-object body: {}",
            id, other
        ))),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: &str, mut body: Document) -> StoreResult<InsertResult> {
        body.remove(ID_FIELD);

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO documents (collection, body)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(collection)
        .bind(Value::Object(body))
        .fetch_one(&self.pool)
        .await?;

        debug!(collection, %id, "Inserted document");
        Ok(InsertResult {
            inserted_id: id.into(),
            acknowledged: true,
        })
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let rows: Vec<(Uuid, Value)> = sqlx::query_as(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(id, body)| into_document(id, body))
            .collect()
    }

    async fn find_one(&self, collection: &str, id: DocumentId) -> StoreResult<Option<Document>> {
        let row: Option<(Uuid, Value)> = sqlx::query_as(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, body)| into_document(id, body)).transpose()
    }

    async fn find_and_update_one(
        &self,
        collection: &str,
        id: DocumentId,
        mut assignments: Document,
    ) -> StoreResult<UpdateResult> {
        assignments.remove(ID_FIELD);

        // Rows whose merged body equals the current body are not counted
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = body || $3::jsonb, updated_at = NOW()
            WHERE collection = $1
              AND id = $2
              AND body || $3::jsonb <> body
            "#,
        )
        .bind(collection)
        .bind(id.as_uuid())
        .bind(Value::Object(assignments))
        .execute(&self.pool)
        .await?;

        Ok(UpdateResult {
            acknowledged: true,
            modified_count: result.rows_affected(),
        })
    }

    async fn delete_one(&self, collection: &str, id: DocumentId) -> StoreResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await.map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_document_attaches_identifier() {
        let id = Uuid::new_v4();
        let document = into_document(id, json!({ "name": "Ann" })).unwrap();
        assert_eq!(document[ID_FIELD], json!(id.to_string()));
    }

    #[test]
    fn test_into_document_rejects_scalar_body() {
        let err = into_document(Uuid::new_v4(), json!(3)).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
