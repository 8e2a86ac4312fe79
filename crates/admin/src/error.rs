//! Unified error handling with Sentry integration.
//!
//! All admin route handlers return `Result<T, AppError>`. Unexpected
//! failures (backend, transcode, internal) are captured to Sentry and
//! collapse into a coarse client message; validation, conflict, and
//! not-found responses keep their user-facing text.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use la_matera_core::StatusTransitionError;

use crate::ai::GeneratorError;
use crate::images::TranscodeError;
use crate::supabase::SupabaseError;

/// Application-level error type for the admin service.
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

    /// The request conflicts with current state (status machine).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request body is well-formed but semantically invalid.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// A required upstream capability is unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StatusTransitionError> for AppError {
    fn from(err: StatusTransitionError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<GeneratorError> for AppError {
    fn from(err: GeneratorError) -> Self {
        Self::ServiceUnavailable(err.to_string())
    }
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        Self::Internal(format!("image transcode failed: {err}"))
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
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Don't expose internal error details to clients
        let message = match &error {
            Self::Backend(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(message)
            | Self::Conflict(message)
            | Self::Unprocessable(message)
            | Self::ServiceUnavailable(message) => message.clone(),
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
            status_of(AppError::BadRequest("name is required".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("order is cancelled".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::Unprocessable("unknown status".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::ServiceUnavailable("no providers".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_terminal_transition_maps_to_conflict() {
        let err: AppError = la_matera_core::OrderStatus::Cancelled
            .validate_transition(la_matera_core::OrderStatus::Paid)
            .unwrap_err()
            .into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_generator_exhaustion_maps_to_503() {
        let err: AppError = GeneratorError::AllProvidersFailed.into();
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_backend_not_found_maps_to_404() {
        let err = AppError::Backend(SupabaseError::NotFound("product abc".to_string()));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
