//! Unified error handling for the server.
//!
//! Every handler returns [`AppError`] on failure; the `IntoResponse` impl is
//! the single place request errors become the API's `{message, errors?}`
//! body. Server-side failures are reported to Sentry and logged; their
//! detail never reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::FieldError;

/// Application-level error type for the employee API.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more request fields failed validation.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The email natural key is already in use.
    #[error("Employee with this email already exists")]
    DuplicateEmail,

    /// No employee exists for the given id.
    #[error("Employee not found")]
    NotFound,

    /// The id in the request path is not a well-formed identifier.
    #[error("Invalid employee ID")]
    MalformedId,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::DuplicateEmail,
            other => Self::Database(other),
        }
    }
}

/// JSON error body: `{"message": ..., "errors": [{field, message}, ...]}`.
/// `errors` is present only for validation failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Report server errors; client errors are just request outcomes
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Employee API request error"
            );
        }

        let status = match &self {
            Self::Validation(_) | Self::DuplicateEmail | Self::MalformedId => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => ErrorBody {
                message: "Validation failed".to_string(),
                errors: Some(errors),
            },
            Self::Database(_) | Self::Internal(_) => ErrorBody {
                message: "Server error".to_string(),
                errors: None,
            },
            other => ErrorBody {
                message: other.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
