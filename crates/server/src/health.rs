//! Readiness endpoint, served without credentials.

use api_types::health::Health;
use axum::{Json, extract::State, http::StatusCode};

use crate::server::ServerState;

/// `200` when the store answers, `503` otherwise.
pub async fn get(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    let connected = state.engine.is_ready().await;
    let status = if connected {
        StatusCode::OK
    } else {
        tracing::warn!("health check: database unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(Health {
            connected,
            database: state.engine.backend_name(),
        }),
    )
}
