use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Request-scoped errors with an HTTP status mapping. Nothing here is
/// process-fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    /// User-correctable input problem.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials. The message is identical for an unknown email and a
    /// wrong password; callers must not replace it with anything more specific.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Missing, invalid or expired bearer token.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Authenticated but lacking the required role.
    #[error("Access denied")]
    Forbidden,

    /// Duplicate email or external identity.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

/// The authoritative uniqueness guarantee comes from the database constraint;
/// callers use this to translate the violation into a Conflict.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = e {
        matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    } else {
        false
    }
}
