use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Authenticated identity resolved from the session cookie. This is the only
/// source of "current user" for ownership-scoped handlers; no handler
/// accepts a user id from client input.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Session gate for user-scoped routes: verify the cookie, inject
/// `CurrentUser` into request extensions, or redirect to the login view.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.sessions.from_headers(request.headers()) {
        Ok(user_id) => {
            request
                .extensions_mut()
                .insert(CurrentUser { id: user_id });
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!("unauthenticated request to gated route: {err}");
            AppError::Unauthenticated.into_response()
        }
    }
}
