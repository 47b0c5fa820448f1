//! Empleado handlers
//!
//! Listing accepts an optional `empresaId` scope. Empleador users may only
//! query their own empresa; an Empleado may only fetch its own record.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{EmpleadoCreate, EmpleadoUpdate, EmpleadoView};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::empleado;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub empresa_id: Option<i64>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/empleados - list credit lines, optionally for one empresa
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<EmpleadoView>>>> {
    let empleados = match query.empresa_id {
        Some(empresa_id) => {
            user.require_empresa_access(empresa_id)?;
            empleado::find_by_empresa(&state.pool, empresa_id).await?
        }
        None => {
            user.require_backoffice()?;
            empleado::find_all(&state.pool, query.include_inactive).await?
        }
    };
    Ok(Json(ApiResponse::success(
        empleados.into_iter().map(EmpleadoView::from).collect(),
    )))
}

/// GET /api/empleados/{id} - credit line detail
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<EmpleadoView>>> {
    let registro = empleado::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmpleadoNotFound))?;
    if user.empleado_id != Some(id) {
        user.require_empresa_access(registro.empresa_id)?;
    }
    Ok(Json(ApiResponse::success(registro.into())))
}

/// POST /api/empleados - enroll an employee
///
/// The saldo starts equal to the limite; no opening balance is accepted.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<EmpleadoCreate>,
) -> AppResult<Json<ApiResponse<EmpleadoView>>> {
    user.require_backoffice()?;
    let registro = empleado::create(&state.pool, payload).await?;
    tracing::info!(
        empleado_id = registro.id,
        empresa_id = registro.empresa_id,
        limite = registro.limite_credito,
        "empleado enrolled"
    );
    Ok(Json(ApiResponse::success(registro.into())))
}

/// PUT /api/empleados/{id} - partial update
///
/// Changing the limite shifts the saldo by the same delta, clamped to
/// `[0, nuevo limite]`.
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmpleadoUpdate>,
) -> AppResult<Json<ApiResponse<EmpleadoView>>> {
    user.require_backoffice()?;
    let registro = empleado::update(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro.into())))
}
