//! Empresa handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{EmpleadoView, Empresa, EmpresaCreate, EmpresaUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{empleado, empresa};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/empresas - list employers
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Empresa>>>> {
    user.require_backoffice()?;
    let empresas = empresa::find_all(&state.pool, query.include_inactive).await?;
    Ok(Json(ApiResponse::success(empresas)))
}

/// GET /api/empresas/{id} - employer detail
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Empresa>>> {
    user.require_empresa_access(id)?;
    let registro = empresa::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmpresaNotFound))?;
    Ok(Json(ApiResponse::success(registro)))
}

/// POST /api/empresas - register an employer
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EmpresaCreate>,
) -> AppResult<Json<ApiResponse<Empresa>>> {
    user.require_backoffice()?;
    let registro = empresa::create(&state.pool, payload).await?;
    tracing::info!(empresa_id = registro.id, nombre = %registro.nombre, "empresa created");
    Ok(Json(ApiResponse::success(registro)))
}

/// PUT /api/empresas/{id} - partial update
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmpresaUpdate>,
) -> AppResult<Json<ApiResponse<Empresa>>> {
    user.require_backoffice()?;
    let registro = empresa::update(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro)))
}

/// GET /api/empresas/{id}/empleados - the employer's credit lines
pub async fn empleados(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<EmpleadoView>>>> {
    user.require_empresa_access(id)?;
    let empleados = empleado::find_by_empresa(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(
        empleados.into_iter().map(EmpleadoView::from).collect(),
    )))
}
