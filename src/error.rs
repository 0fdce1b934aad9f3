// Error handling module for the Hospital API
// Provides the crate-wide error taxonomy and its HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

/// Main error type for the patient and user endpoints
/// Authentication and authorization failures live in `auth::AuthError`
/// and render the same `ErrorResponse` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input (bad id, bad JSON, unparseable filter)
    /// Maps to HTTP 400 Bad Request
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Field-level validation failures from the validator crate
    /// Maps to HTTP 400 Bad Request
    #[error("validation failed: {0}")]
    ValidationError(validator::ValidationErrors),

    /// Entity absent
    /// Maps to HTTP 404 Not Found
    #[error("{resource} with id {id} not found")]
    NotFound { resource: String, id: String },

    /// Uniqueness violation reported by the storage layer
    /// Maps to HTTP 500 like every other persistence failure
    #[error("duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    /// Any other storage-layer failure
    /// Maps to HTTP 500 Internal Server Error, details are never sent to clients
    #[error("database error: {0}")]
    PersistenceError(#[from] sqlx::Error),
}

/// Consistent error response structure
///
/// Every failure, whatever module raised it, is rendered with this body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "INVALID_ARGUMENT", "NOT_FOUND")
    #[schema(example = "NOT_FOUND")]
    pub error_code: String,

    /// Human-readable error message
    #[schema(example = "Patient with id 7 not found")]
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// ISO 8601 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_error_response();
        (status, Json(body)).into_response()
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Client errors are logged at debug, storage failures at error with the
    /// full cause; the cause itself never reaches the response body.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::InvalidArgument(message) => {
                debug!("Invalid argument: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("INVALID_ARGUMENT", message.clone()),
                )
            }
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                        .with_details(
                            serde_json::to_value(errors).unwrap_or(serde_json::json!({})),
                        ),
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id)),
                )
            }
            ApiError::Duplicate { field, value } => {
                warn!("Uniqueness violation on {}", field);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "PERSISTENCE_ERROR",
                        format!("A record with {} '{}' already exists", field, value),
                    ),
                )
            }
            ApiError::PersistenceError(db_error) => {
                error!("Database error: {:?}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("PERSISTENCE_ERROR", "A database error occurred"),
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Duplicate { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// Returns true when a sqlx error is a UNIQUE constraint violation
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
