//! Proveedor handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Proveedor, ProveedorCreate, ProveedorUpdate, Tienda, TiendaCreate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{proveedor, tienda};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/proveedores - list merchants
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Proveedor>>>> {
    user.require_backoffice()?;
    let proveedores = proveedor::find_all(&state.pool, query.include_inactive).await?;
    Ok(Json(ApiResponse::success(proveedores)))
}

/// GET /api/proveedores/{id} - merchant detail
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Proveedor>>> {
    user.require_backoffice()?;
    let registro = proveedor::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProveedorNotFound))?;
    Ok(Json(ApiResponse::success(registro)))
}

/// POST /api/proveedores - register a merchant
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProveedorCreate>,
) -> AppResult<Json<ApiResponse<Proveedor>>> {
    user.require_backoffice()?;
    let registro = proveedor::create(&state.pool, payload).await?;
    tracing::info!(
        proveedor_id = registro.id,
        nombre = %registro.nombre,
        comision = registro.porcentaje_comision,
        "proveedor created"
    );
    Ok(Json(ApiResponse::success(registro)))
}

/// PUT /api/proveedores/{id} - partial update
///
/// A commission change only affects documentos consolidated afterwards;
/// already-emitted CxP keep the percentage captured at emission.
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProveedorUpdate>,
) -> AppResult<Json<ApiResponse<Proveedor>>> {
    user.require_backoffice()?;
    let registro = proveedor::update(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro)))
}

/// GET /api/proveedores/{id}/tiendas - the merchant's stores
pub async fn tiendas(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Tienda>>>> {
    user.require_backoffice()?;
    let tiendas = tienda::find_by_proveedor(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(tiendas)))
}

/// POST /api/proveedores/{id}/tiendas - add a store
pub async fn create_tienda(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TiendaCreate>,
) -> AppResult<Json<ApiResponse<Tienda>>> {
    user.require_backoffice()?;
    if proveedor::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::new(ErrorCode::ProveedorNotFound));
    }
    let registro = tienda::create(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro)))
}
