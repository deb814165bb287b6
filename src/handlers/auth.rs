use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthError;
use crate::error::AppError;
use crate::views;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn register_form() -> impl IntoResponse {
    views::register()
}

/// POST /register. Success establishes a session and lands on the list;
/// any failure sends the client back to the registration view with no
/// detail beyond the redirect.
pub async fn register_submit(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state
        .auth
        .register(&credentials.username, &credentials.password)
        .await
    {
        Ok(user) => {
            info!(user = %user.id, "registered new user");
            start_session(&state, user.id)
        }
        Err(AuthError::DuplicateUsername) => {
            info!("registration rejected: username taken");
            AppError::DuplicateUsername.into_response()
        }
        Err(err) => {
            warn!("registration failed: {err}");
            Redirect::to("/register").into_response()
        }
    }
}

pub async fn login_form() -> impl IntoResponse {
    views::login()
}

/// POST /login. Failures of any kind collapse into a redirect to the login
/// view; nothing about the cause is leaked to the client.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state
        .auth
        .login(&credentials.username, &credentials.password)
        .await
    {
        Ok(user) => start_session(&state, user.id),
        Err(err) => {
            info!("login rejected: {err}");
            AppError::InvalidCredentials.into_response()
        }
    }
}

/// GET /logout — clears the session unconditionally.
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(SET_COOKIE, state.sessions.clear_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// GET /auth/google — send the browser into the federated handshake.
pub async fn google_start(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.google.authorize_url())
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallback {
    pub code: Option<String>,
}

/// GET /auth/google/callback. Resolves the code to a profile and the
/// profile to a user; every failure path falls back to the login view.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(callback): Query<GoogleCallback>,
) -> Response {
    let Some(code) = callback.code.as_deref() else {
        info!("federated login denied or cancelled");
        return AppError::Unauthenticated.into_response();
    };

    let profile = match state.google.exchange_code(code).await {
        Ok(token) => state.google.fetch_profile(&token).await,
        Err(err) => {
            warn!("federated token exchange failed: {err}");
            return AppError::Unauthenticated.into_response();
        }
    };

    let profile = match profile {
        Ok(profile) => profile,
        Err(err) => {
            warn!("federated profile fetch failed: {err}");
            return AppError::Unauthenticated.into_response();
        }
    };

    match state.auth.find_or_create(&profile.sub).await {
        Ok(user) => start_session(&state, user.id),
        Err(err) => {
            warn!("federated identity resolution failed: {err}");
            AppError::Unauthenticated.into_response()
        }
    }
}

/// Serialize the authenticated identity into the session cookie and land on
/// the main view.
fn start_session(state: &AppState, user_id: Uuid) -> Response {
    match state.sessions.sign(user_id) {
        Ok(token) => (
            [(SET_COOKIE, state.sessions.cookie(&token))],
            Redirect::to("/list"),
        )
            .into_response(),
        Err(err) => {
            warn!("could not establish session: {err}");
            Redirect::to("/login").into_response()
        }
    }
}
