use axum::{extract::State, Json};
use serde::Serialize;
use shared::error::ApiResponse;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// GET /api/health - liveness probe, unauthenticated
pub async fn health(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<HealthStatus>>> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => "up",
        Err(_) => "down",
    };
    Ok(Json(ApiResponse::success(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })))
}
