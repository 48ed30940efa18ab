//! Group API endpoints

use api_types::group::{Group, GroupNew};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn group_view(group: engine::Group) -> Group {
    Group {
        id: group.id,
        name: group.name,
        participants: group.participants,
        created_at: group.created_at,
    }
}

/// Handle requests for creating a group with its roster
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<GroupNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Group>), ServerError> {
    let Json(payload) = payload?;
    let group = state
        .engine
        .create_group(&payload.name, &payload.participants)
        .await?;

    Ok((StatusCode::CREATED, Json(group_view(group))))
}

/// Handle requests for listing every group
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Group>>, ServerError> {
    let groups = state.engine.list_groups().await?;
    Ok(Json(groups.into_iter().map(group_view).collect()))
}

/// Handle requests for a single group
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Group>, ServerError> {
    Ok(Json(group_view(state.engine.group(&id).await?)))
}
