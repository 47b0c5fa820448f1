use axum::extract::{Path, State};
use axum::Json;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Caja, CajaCreate, Tienda, TiendaUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{caja, tienda};
use crate::utils::AppResult;

/// PUT /api/tiendas/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TiendaUpdate>,
) -> AppResult<Json<ApiResponse<Tienda>>> {
    user.require_backoffice()?;
    let registro = tienda::update(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro)))
}

/// GET /api/tiendas/{id}/cajas - the store's registers
pub async fn cajas(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Caja>>>> {
    user.require_backoffice()?;
    let cajas = caja::find_by_tienda(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(cajas)))
}

/// POST /api/tiendas/{id}/cajas - add a register
pub async fn create_caja(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CajaCreate>,
) -> AppResult<Json<ApiResponse<Caja>>> {
    user.require_backoffice()?;
    if tienda::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::new(ErrorCode::TiendaNotFound));
    }
    let registro = caja::create(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro)))
}
