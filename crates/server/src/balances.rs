//! Balance API endpoints

use api_types::balance::{GroupBalances, RunningBalance};
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

/// Handle requests for the balances of a group, recomputed from its ledger
pub async fn group(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupBalances>, ServerError> {
    Ok(Json(state.engine.group_balances(&group_id).await?))
}

/// Handle requests for the running totals of every username
pub async fn running(
    State(state): State<ServerState>,
) -> Result<Json<Vec<RunningBalance>>, ServerError> {
    let entries = state.engine.running_balances().await?;
    Ok(Json(
        entries
            .into_iter()
            .map(|entry| RunningBalance {
                username: entry.username,
                balance: entry.balance,
                updated_at: entry.updated_at,
            })
            .collect(),
    ))
}
