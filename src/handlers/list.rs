use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::store::{default_list, Item};
use crate::views;
use crate::AppState;

/// GET /list. Seeds the default list on first view (atomic set-if-absent,
/// then re-render via redirect so the fresh list is shown); otherwise
/// renders the caller's list. A store failure here surfaces as a retryable
/// 503 — silently redirecting would loop.
pub async fn view(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let Some(loaded) = state.store.find_user(user.id).await? else {
        // Session refers to a user the store no longer knows. Drop it.
        info!(user = %user.id, "session for unknown user, clearing");
        return Ok((
            [(SET_COOKIE, state.sessions.clear_cookie())],
            Redirect::to("/login"),
        )
            .into_response());
    };

    match loaded.list {
        Some(list) => Ok(views::list(&list).into_response()),
        None => {
            state
                .store
                .init_list_if_absent(user.id, &default_list())
                .await?;
            Ok(Redirect::to("/list").into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub new_item: String,
}

/// POST /add. Appends one item with a fresh id. Store failures are logged
/// and the client is redirected regardless.
pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<AddItem>,
) -> Redirect {
    let task = form.new_item.trim();
    if task.is_empty() {
        return Redirect::to("/list");
    }

    if let Err(err) = state.store.push_item(user.id, &Item::new(task)).await {
        error!(user = %user.id, "could not add item: {err}");
    }
    Redirect::to("/list")
}

#[derive(Debug, Deserialize)]
pub struct DeleteItem {
    pub checkbox: String,
}

/// POST /delete. Removes the item whose id was checked; an id that matches
/// nothing is a no-op. Store failures are logged and the client is
/// redirected regardless.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<DeleteItem>,
) -> Redirect {
    match Uuid::parse_str(form.checkbox.trim()) {
        Ok(item_id) => {
            if let Err(err) = state.store.pull_item(user.id, item_id).await {
                error!(user = %user.id, "could not delete item: {err}");
            }
        }
        Err(_) => info!("delete ignored: malformed item id"),
    }
    Redirect::to("/list")
}
