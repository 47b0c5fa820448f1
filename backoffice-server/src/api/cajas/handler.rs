use axum::extract::{Path, State};
use axum::Json;
use shared::error::ApiResponse;
use shared::models::{Caja, CajaUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::caja;
use crate::utils::AppResult;

/// PUT /api/cajas/{id} - partial update (rename, activate, deactivate)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CajaUpdate>,
) -> AppResult<Json<ApiResponse<Caja>>> {
    user.require_backoffice()?;
    let registro = caja::update(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro)))
}
