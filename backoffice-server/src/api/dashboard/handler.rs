use axum::{extract::State, Json};
use shared::error::ApiResponse;
use shared::models::DashboardResumen;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/dashboard - KPI aggregate scoped to the caller's rol
pub async fn resumen(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<DashboardResumen>>> {
    let scope = user.dashboard_scope()?;
    let resumen = state.billing.dashboard_resumen(scope).await?;
    Ok(Json(ApiResponse::success(resumen)))
}
