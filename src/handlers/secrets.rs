use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::error;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::views;
use crate::AppState;

/// GET /secrets. Public aggregation wall: every submitted secret, no author
/// attribution. On store failure the wall renders empty rather than erroring
/// a public page.
pub async fn wall(State(state): State<AppState>) -> Html<String> {
    let secrets = match state.store.users_with_secrets().await {
        Ok(users) => users.into_iter().filter_map(|u| u.secret).collect(),
        Err(err) => {
            error!("could not load secrets wall: {err}");
            Vec::new()
        }
    };
    views::secrets(&secrets)
}

/// GET /submit — the gated submission form.
pub async fn submit_form(Extension(_user): Extension<CurrentUser>) -> Html<String> {
    views::submit()
}

#[derive(Debug, Deserialize)]
pub struct SubmitSecret {
    pub secret: String,
}

/// POST /submit. The route is gated, and the handler re-checks the session
/// identity against the store before overwriting the secret wholesale.
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<SubmitSecret>,
) -> Result<Response, AppError> {
    match state.store.find_user(user.id).await {
        Ok(Some(_)) => {
            if let Err(err) = state.store.set_secret(user.id, form.secret.trim()).await {
                error!(user = %user.id, "could not save secret: {err}");
            }
        }
        Ok(None) => return Err(AppError::Unauthenticated),
        Err(err) => error!(user = %user.id, "could not re-check user: {err}"),
    }
    Ok(Redirect::to("/secrets").into_response())
}
