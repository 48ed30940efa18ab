//! Account endpoints, served without credentials.

use api_types::user::{UserCreated, UserNew};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

/// Handle requests for registering a new user
pub async fn register(
    State(state): State<ServerState>,
    payload: Result<Json<UserNew>, JsonRejection>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let Json(payload) = payload?;
    let username = state
        .engine
        .create_user(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserCreated { username })))
}
