use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::store::StoreError;

/// Top-level request error with the redirect-first mapping this app uses:
/// authentication problems land the client on `/login`, registration
/// conflicts on `/register`, and store failures are logged and answered with
/// a retryable 503 when no best-effort redirect is possible.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username is already taken")]
    DuplicateUsername,

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated | AppError::InvalidCredentials => {
                Redirect::to("/login").into_response()
            }
            AppError::DuplicateUsername => Redirect::to("/register").into_response(),
            AppError::Store(err) => {
                tracing::error!("store failure while handling request: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The service is temporarily unavailable. Please try again.",
                )
                    .into_response()
            }
        }
    }
}
