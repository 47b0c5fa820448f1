//! Consumo handlers
//!
//! Registration resolves the caja chain (caja, tienda, proveedor) and the
//! empleado's empresa server-side; the wire payload only names the caja and
//! the empleado. Credit deduction and the insert run in one transaction in
//! the repository.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Consumo, ConsumoCreate, ConsumoDetalle, Rol};
use shared::pagination::PaginatedResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::consumo::{ConsumoFilter, NewConsumo};
use crate::db::repository::{caja, consumo, empleado};
use crate::utils::{time, validation, AppResult};

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 200;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub desde: Option<String>,
    pub hasta: Option<String>,
    pub empresa_id: Option<i64>,
    pub proveedor_id: Option<i64>,
    pub empleado_id: Option<i64>,
    #[serde(default)]
    pub solo_reversados: bool,
    pub busqueda: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Narrow the requested filter to what the caller's rol may see.
fn scope_filter(user: &CurrentUser, filter: &mut ConsumoFilter) -> AppResult<()> {
    match user.rol {
        Rol::Admin | Rol::Backoffice => Ok(()),
        Rol::Empleador => {
            let empresa_id = user.empresa_id.ok_or_else(AppError::unauthorized)?;
            if filter.empresa_id.is_some_and(|id| id != empresa_id) {
                return Err(AppError::forbidden("No tiene acceso a esa empresa"));
            }
            filter.empresa_id = Some(empresa_id);
            Ok(())
        }
        Rol::Empleado => {
            let empleado_id = user.empleado_id.ok_or_else(AppError::unauthorized)?;
            if filter.empleado_id.is_some_and(|id| id != empleado_id) {
                return Err(AppError::forbidden("No tiene acceso a ese empleado"));
            }
            filter.empleado_id = Some(empleado_id);
            Ok(())
        }
        Rol::Cajero => Err(AppError::forbidden(
            "No tiene permiso para consultar el historial de consumos",
        )),
    }
}

/// GET /api/consumos - paged history with filters
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<ConsumoDetalle>>>> {
    let tz = state.config.timezone;
    let mut filter = ConsumoFilter {
        empresa_id: query.empresa_id,
        proveedor_id: query.proveedor_id,
        empleado_id: query.empleado_id,
        desde: None,
        hasta: None,
        solo_reversados: query.solo_reversados,
        busqueda: query.busqueda.filter(|s| !s.trim().is_empty()),
    };
    if let Some(desde) = &query.desde {
        filter.desde = Some(time::day_start_millis(time::parse_date(desde)?, tz));
    }
    if let Some(hasta) = &query.hasta {
        filter.hasta = Some(time::day_end_millis(time::parse_date(hasta)?, tz));
    }
    scope_filter(&user, &mut filter)?;

    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
    let result = consumo::list(&state.pool, &filter, page, page_size).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// GET /api/consumos/{id}
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Consumo>>> {
    let registro = consumo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ConsumoNotFound))?;
    if user.empleado_id != Some(registro.empleado_id) {
        user.require_empresa_access(registro.empresa_id)?;
    }
    Ok(Json(ApiResponse::success(registro)))
}

/// POST /api/consumos - register a consumption at a caja
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ConsumoCreate>,
) -> AppResult<Json<ApiResponse<Consumo>>> {
    user.require_caja_access(payload.caja_id)?;
    validation::validate_monto_positivo(payload.monto, "monto")?;
    validation::validate_optional_text(&payload.concepto, "concepto", 200)?;
    validation::validate_optional_text(&payload.referencia, "referencia", 100)?;

    let contexto = caja::resolve_context(&state.pool, payload.caja_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CajaNotFound))?;
    let titular = empleado::find_by_id(&state.pool, payload.empleado_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmpleadoNotFound))?;

    let registro = consumo::create(
        &state.pool,
        NewConsumo {
            empleado_id: titular.id,
            empresa_id: titular.empresa_id,
            proveedor_id: contexto.proveedor_id,
            tienda_id: contexto.tienda_id,
            caja_id: contexto.caja_id,
            monto: payload.monto,
            concepto: payload.concepto,
            referencia: payload.referencia,
            registrado_por: user.id,
            fecha: Utc::now().timestamp_millis(),
        },
    )
    .await?;

    tracing::info!(
        consumo_id = registro.id,
        empleado_id = registro.empleado_id,
        caja_id = registro.caja_id,
        monto = registro.monto,
        "consumo registered"
    );
    Ok(Json(ApiResponse::success(registro)))
}

/// POST /api/consumos/{id}/reversar - void a consumption and restore credit
pub async fn reversar(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Consumo>>> {
    user.require_backoffice()?;
    let registro = state.billing.reversar_consumo(id).await?;
    Ok(Json(ApiResponse::success(registro)))
}
