//! User CRUD handlers: create, list, read, update, delete.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::model::{NewUser, UserChanges};
use crate::response::{created, message, ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

const USER_NOT_FOUND: &str = "User not found";

/// Path ids that are not an `i32` cannot name a row.
fn parse_id(id_str: &str) -> Option<i32> {
    id_str.parse().ok()
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let new_user = NewUser::from_wire(&body)?;
    let user = state.store.create_user(new_user).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok(created(user))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.store.list_users().await?;
    Ok(ok(users))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(USER_NOT_FOUND.into());
    let id = parse_id(&id_str).ok_or_else(not_found)?;
    let user = state.store.get_user(id).await?.ok_or_else(not_found)?;
    Ok(ok(user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::InvalidId { entity: "user" };
    let id = parse_id(&id_str).ok_or_else(invalid)?;
    if state.store.get_user(id).await?.is_none() {
        return Err(invalid());
    }
    let changes = UserChanges::from_wire(&body)?;
    let user = state.store.update_user(id, changes).await?.ok_or_else(invalid)?;
    tracing::info!(user_id = user.id, "user updated");
    Ok(ok(user))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::InvalidId { entity: "user" };
    let id = parse_id(&id_str).ok_or_else(invalid)?;
    if !state.store.delete_user(id).await? {
        return Err(invalid());
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(message("User deleted successfully"))
}
