//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures unexpected errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. No raw internal detail crosses the boundary:
//! backend failures collapse into a coarse message, while not-found and
//! validation errors keep their user-facing text.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::supabase::SupabaseError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// Request failed validation.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(message) => Self::BadRequest(message),
            CheckoutError::Backend(SupabaseError::NotFound(what)) => Self::NotFound(what),
            CheckoutError::Backend(inner) => Self::Backend(inner),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // NotFound from the backend is a user state, not a failure
        let error = match self {
            Self::Backend(SupabaseError::NotFound(what)) => Self::NotFound(what),
            other => other,
        };

        // Capture server errors to Sentry
        if matches!(error, Self::Backend(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&error);
            tracing::error!(
                error = %error,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &error {
            Self::Backend(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        // Don't expose internal error details to clients
        let message = match &error {
            Self::Backend(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(message) => message.clone(),
            Self::NotFound(what) => format!("{what} not found"),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("order abc".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::BadRequest("name is required".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Backend(SupabaseError::Api {
                status: 500,
                message: "oops".to_string()
            })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backend_not_found_maps_to_404() {
        let err = AppError::Backend(SupabaseError::NotFound("product yerba".to_string()));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_checkout_validation_maps_to_bad_request() {
        let err: AppError = CheckoutError::Validation("cart is empty".to_string()).into();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
