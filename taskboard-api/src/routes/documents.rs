/// Generic resource handlers
///
/// Every entity kind exposes the same five operations, so the handlers are
/// written once and instantiated per [`Entity`] type in the router.
///
/// # Endpoints (per collection)
///
/// - `GET    /v1/{collection}`     - List every document
/// - `GET    /v1/{collection}/:id` - Fetch one document
/// - `POST   /v1/{collection}`     - Create a document
/// - `PUT    /v1/{collection}`     - Partial update (body carries `_id`)
/// - `DELETE /v1/{collection}`     - Delete (body is `{ "_id": ... }`)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskboard_shared::{
    models::{DocumentId, Entity},
    patch::validate_document,
    store::{DeleteResult, InsertResult, UpdateResult},
};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Delete request body
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteRequest {
    /// Identifier of the document to delete
    #[serde(rename = "_id")]
    pub id: String,
}

fn parse_id(raw: &str) -> ApiResult<DocumentId> {
    raw.parse::<DocumentId>()
        .map_err(|err| ApiError::BadRequest(format!("Malformed identifier: {:?}", err.0)))
}

fn decode<E: Entity>(document: taskboard_shared::models::Document) -> ApiResult<E> {
    E::from_document(document).map_err(|err| {
        ApiError::InternalError(format!(
            "Stored {} document failed to decode: {}",
            E::KIND,
            err
        ))
    })
}

/// List all documents of a collection
///
/// Every stored document is decoded into the typed entity; one bad document
/// fails the whole request.
pub async fn list<E: Entity>(State(state): State<AppState>) -> ApiResult<Json<Vec<E>>> {
    let documents = state.store.find_all(E::KIND.collection()).await?;

    let entities = documents
        .into_iter()
        .map(decode::<E>)
        .collect::<ApiResult<Vec<E>>>()?;

    Ok(Json(entities))
}

/// Fetch one document by identifier
///
/// # Errors
///
/// - `400 Bad Request`: Malformed identifier
/// - `404 Not Found`: No such document
pub async fn get_one<E: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<E>> {
    let id = parse_id(&id)?;

    let document = state
        .store
        .find_one(E::KIND.collection(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} {} not found", E::KIND, id)))?;

    Ok(Json(decode::<E>(document)?))
}

/// Create a document
///
/// The payload must not carry `_id` or server-assigned fields. The encoded
/// body is checked against the same field table as partial updates.
///
/// # Response
///
/// ```json
/// { "insertedId": "uuid", "acknowledged": true }
/// ```
pub async fn create<E: Entity>(
    State(state): State<AppState>,
    payload: Result<Json<E::New>, JsonRejection>,
) -> ApiResult<Json<InsertResult>> {
    let Json(input) = payload?;
    input.validate()?;

    let body = E::into_document(input)
        .map_err(|err| ApiError::InternalError(format!("Failed to encode {}: {}", E::KIND, err)))?;
    validate_document(E::KIND, &body)?;

    let result = state.store.insert_one(E::KIND.collection(), body).await?;

    tracing::info!(kind = %E::KIND, id = %result.inserted_id, "Created document");
    Ok(Json(result))
}

/// Apply a partial update
///
/// Fields sent as `null` or `""` are left unchanged.
///
/// # Response
///
/// ```json
/// { "acknowledged": true, "modifiedCount": 1 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or identifier
/// - `422 Unprocessable Entity`: Field or enum violation
/// - `503 Service Unavailable`: Document store unreachable
pub async fn update<E: Entity>(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<UpdateResult>> {
    let Json(patch) = payload?;

    let result = state.engine.update_partial(E::KIND, &patch).await?;

    Ok(Json(result))
}

/// Delete a document by identifier
///
/// Deleting a missing document reports `deletedCount: 0`.
pub async fn remove<E: Entity>(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> ApiResult<Json<DeleteResult>> {
    let Json(request) = payload?;
    let id = parse_id(&request.id)?;

    let result = state.store.delete_one(E::KIND.collection(), id).await?;

    tracing::info!(
        kind = %E::KIND,
        %id,
        deleted_count = result.deleted_count,
        "Deleted document"
    );
    Ok(Json(result))
}
