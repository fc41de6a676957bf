use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")] Unauthenticated(String),
    #[error("{0}")] Forbidden(String),
    #[error("{0}")] InvalidInput(String),
    #[error("{0}")] NotFound(String),
    #[error("{0}")] Conflict(String),
    #[error("internal error")] Internal,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated("authentication required".into())
    }

    pub fn event_not_found() -> Self {
        Self::NotFound("Event not found".into())
    }

    /// Stable machine-checkable kind, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                tracing::debug!(?err, "unique violation");
                return ApiError::Conflict("duplicate key".into());
            }
        }
        tracing::error!(?err, "store failure");
        ApiError::Internal
    }
}

#[derive(Serialize)]
struct ErrorBody { error_code: &'static str, message: String }

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = axum::Json(ErrorBody { error_code: self.code(), message: self.to_string() });
        (self.status(), body).into_response()
    }
}
