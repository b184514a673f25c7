/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`, which converts to the matching
/// status code and a JSON error body.
///
/// # Response Format
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": [{ "field": "status", "message": "Expected one of: todo, in-progress, done" }]
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::{
    engine::EngineError,
    patch::{FieldViolation, PatchError},
    store::StoreError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): malformed JSON or identifier
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503) - document store unreachable
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl From<FieldViolation> for ValidationErrorDetail {
    fn from(violation: FieldViolation) -> Self {
        Self {
            field: violation.field,
            message: violation.message,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "The document store is unavailable".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert partial update errors to API errors
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(violations) => {
                ApiError::ValidationError(violations.into_iter().map(Into::into).collect())
            }
            EngineError::MalformedIdentifier(raw) => {
                ApiError::BadRequest(format!("Malformed identifier: {:?}", raw))
            }
            EngineError::StoreUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            EngineError::Store(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert field table violations to API errors
impl From<PatchError> for ApiError {
    fn from(err: PatchError) -> Self {
        EngineError::from(err).into()
    }
}

/// Convert document store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            StoreError::Backend(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert request body extraction failures to API errors
///
/// Bodies that parse as JSON but do not fit the payload type (unknown field,
/// enum value outside its vocabulary, wrong type) are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "body".to_string(),
                    message: err.body_text(),
                }])
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert `validator` derive errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_engine_errors_map_to_statuses() {
        let cases = [
            (
                EngineError::Validation(vec![FieldViolation::new("status", "bad")]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                EngineError::MalformedIdentifier("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::StoreUnavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EngineError::Store("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_details_keep_fields() {
        let err = ApiError::from(EngineError::Validation(vec![
            FieldViolation::new("email", "Invalid email address"),
            FieldViolation::new("role", "Expected one of: frontend, backend, fullstack"),
        ]));

        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0].field, "email");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
