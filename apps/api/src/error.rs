//! Error handling for the Murmur API
//!
//! This module provides a unified error type using thiserror, with HTTP
//! status code mapping via Axum's IntoResponse trait and conversion into
//! GraphQL field errors for resolvers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client-side handling
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Request Errors ==========
    /// Query or input validation failed
    #[error("validation error: {0}")]
    ValidationError(String),

    // ========== Resource Errors ==========
    /// Requested resource does not exist
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Write violates a uniqueness or reference constraint
    #[error("conflict: {0}")]
    Conflict(String),

    // ========== Storage Errors ==========
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Storage backend cannot serve requests
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    // ========== Response Errors ==========
    /// JSON encoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            Self::NotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 422 Unprocessable Entity
            Self::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 503 Service Unavailable
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }

    /// Convert into a GraphQL field error
    ///
    /// Client errors keep their message. Server errors are logged and
    /// replaced by a generic message so storage internals never reach the
    /// response.
    pub fn into_graphql_error(self) -> async_graphql::Error {
        self.log();
        if self.status_code().is_server_error() {
            async_graphql::Error::new("An unexpected error occurred")
        } else {
            async_graphql::Error::new(self.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

// ========== Conversion Implementations ==========

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::NotFound {
                resource_type: entity,
                id,
            },
            StorageError::Conflict(msg) => Self::Conflict(msg),
            StorageError::Database(err) => Self::Database(err),
            StorageError::Unavailable(msg) => Self::StorageUnavailable(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(StorageError::not_found("user", "123")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::ValidationError("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("duplicate".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::StorageUnavailable("down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::Conflict("duplicate".to_string()).error_code(),
            "CONFLICT"
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolTimedOut).error_code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn test_from_storage_error() {
        let err: ApiError = StorageError::not_found("profile", "p1").into();
        assert_eq!(err.to_string(), "profile not found: p1");

        let err: ApiError = StorageError::Conflict("profile exists".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_graphql_error_hides_server_details() {
        let err = ApiError::Database(sqlx::Error::PoolTimedOut).into_graphql_error();
        assert_eq!(err.message, "An unexpected error occurred");

        let err = ApiError::from(StorageError::not_found("user", "u1")).into_graphql_error();
        assert_eq!(err.message, "user not found: u1");
    }
}
