use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::auth::dto::MessageResponse;
use crate::auth::repo_types::StoreError;

/// Every way a signup or login can fail.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("required field missing or empty")]
    Validation,
    #[error("email already registered")]
    DuplicateIdentifier,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("internal failure: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateIdentifier => AuthError::DuplicateIdentifier,
            StoreError::Database(e) => AuthError::Internal(e.into()),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation | AuthError::DuplicateIdentifier => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text. Internal causes stay in the log.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Validation => "All fields are required",
            AuthError::DuplicateIdentifier => "Email already exists",
            AuthError::InvalidCredentials => "Invalid email or password",
            AuthError::Internal(_) => "Server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(e) = &self {
            error!(error = %e, "request failed");
        }
        let body = MessageResponse {
            message: self.public_message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
