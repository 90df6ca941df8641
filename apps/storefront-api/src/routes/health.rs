//! Liveness and database check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use hornada_db::migrations::migration_status;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub migrations_applied: usize,
    pub migrations_total: usize,
    pub store: String,
    pub currency_symbol: String,
}

/// `200 ok` when the database answers and every migration is applied,
/// otherwise `503 degraded`.
pub async fn health(State(state): State<AppState>) -> Response {
    let database = state.db.health_check().await;

    let (total, applied) = match migration_status(state.db.pool()).await {
        Ok(counts) => counts,
        Err(e) => {
            warn!(error = %e, "Could not read migration status");
            (0, 0)
        }
    };

    let healthy = database && total > 0 && applied == total;

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        database,
        migrations_applied: applied,
        migrations_total: total,
        store: state.config.store.name.clone(),
        currency_symbol: state.config.store.currency_symbol.clone(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body)).into_response()
}
