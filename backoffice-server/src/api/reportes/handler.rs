//! Report handlers

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::models::{AntiguedadReporte, ResumenConsumos};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{time, AppResult};

#[derive(Debug, Deserialize)]
pub struct AntiguedadQuery {
    /// "cxc" or "cxp"
    pub tipo: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumosQuery {
    pub desde: String,
    pub hasta: String,
    pub empresa_id: Option<i64>,
    pub proveedor_id: Option<i64>,
}

/// GET /api/reportes/antiguedad?tipo=cxc|cxp - open documents bucketed by age
pub async fn antiguedad(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<AntiguedadQuery>,
) -> AppResult<Json<ApiResponse<AntiguedadReporte>>> {
    user.require_backoffice()?;
    let reporte = state.billing.reporte_antiguedad(&query.tipo).await?;
    Ok(Json(ApiResponse::success(reporte)))
}

/// GET /api/reportes/consumos?desde&hasta - period consumption summary
pub async fn consumos(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ConsumosQuery>,
) -> AppResult<Json<ApiResponse<ResumenConsumos>>> {
    user.require_backoffice()?;
    let desde = time::parse_date(&query.desde)?;
    let hasta = time::parse_date(&query.hasta)?;
    let resumen = state
        .billing
        .resumen_consumos(desde, hasta, query.empresa_id, query.proveedor_id)
        .await?;
    Ok(Json(ApiResponse::success(resumen)))
}
