// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::StoreError;
use crate::validation::FieldError;

/// Fixed message for request bodies that are not a JSON object
pub const MALFORMED_JSON: &str = "Malformed JSON in request body";

/// Fixed message for bodies over the configured size limit
pub const PAYLOAD_TOO_LARGE: &str = "Request body too large";

/// Every failure a request can end in. Controllers return these and never
/// format error responses themselves.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request - business rule violated
    BadRequest(String),
    // 400 Bad Request - body could not be parsed
    InvalidJson,
    // 400 Bad Request - request failed field validation
    Validation(Vec<FieldError>),

    // 404 Not Found
    NotFound(String),

    // 413 Payload Too Large
    PayloadTooLarge,

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidJson | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => msg,
            ApiError::InvalidJson => MALFORMED_JSON,
            ApiError::PayloadTooLarge => PAYLOAD_TOO_LARGE,
            ApiError::Validation(_) => "Validation failed",
            ApiError::Internal(_) => "Internal server error",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(errors) => json!({ "msg": errors, "success": false }),
            _ => json!({ "msg": self.message(), "success": false }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(collection) => {
                tracing::warn!("Unique key rejected write to {}", collection.name());
                ApiError::conflict(format!("{} already exists", collection.label()))
            }
            StoreError::MissingTenant(collection) => {
                tracing::error!("Unscoped access to {}", collection.name());
                ApiError::internal(format!("{} requires a school_id", collection.name()))
            }
            StoreError::Malformed(msg) => {
                tracing::error!("Malformed document in store: {}", msg);
                ApiError::internal(msg)
            }
            StoreError::Sqlx(e) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", e);
                ApiError::internal(e.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON conversion error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Internal(detail) => write!(f, "{}", detail),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
