//! CxP handlers
//!
//! The payable side is back-office only; merchants are paid net of the
//! commission captured on the documento at emission. There is no
//! refinanciar on CxP.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{
    ConsolidarRequest, DocumentoCxp, Pago, PagoCreate, PreviewCxp, ResumenCxpProveedor,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::documento_cxp;
use crate::utils::{time, AppResult};

/// Document detail with its payment history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentoCxpDetalle {
    #[serde(flatten)]
    pub documento: DocumentoCxp,
    pub pagos: Vec<Pago>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodoQuery {
    pub desde: String,
    pub hasta: String,
}

/// GET /api/cxp/proveedores - per-proveedor payable position
pub async fn resumen(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<ResumenCxpProveedor>>>> {
    user.require_backoffice()?;
    let resumen = documento_cxp::resumen_por_proveedor(&state.pool).await?;
    Ok(Json(ApiResponse::success(resumen)))
}

/// GET /api/cxp/proveedores/{id}/documentos
pub async fn documentos(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DocumentoCxp>>>> {
    user.require_backoffice()?;
    let documentos = documento_cxp::find_by_proveedor(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(documentos)))
}

/// GET /api/cxp/proveedores/{id}/preview-consolidado?desde&hasta
pub async fn preview(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(query): Query<PeriodoQuery>,
) -> AppResult<Json<ApiResponse<PreviewCxp>>> {
    user.require_backoffice()?;
    let desde = time::parse_date(&query.desde)?;
    let hasta = time::parse_date(&query.hasta)?;
    let preview = state.billing.preview_cxp(id, desde, hasta).await?;
    Ok(Json(ApiResponse::success(preview)))
}

/// POST /api/cxp/proveedores/{id}/consolidar - emit a CxP documento
pub async fn consolidar(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ConsolidarRequest>,
) -> AppResult<Json<ApiResponse<DocumentoCxp>>> {
    user.require_backoffice()?;
    let desde = time::parse_date(&payload.periodo_desde)?;
    let hasta = time::parse_date(&payload.periodo_hasta)?;
    let documento = state.billing.consolidar_cxp(id, desde, hasta).await?;
    Ok(Json(ApiResponse::success(documento)))
}

/// GET /api/cxp/documentos/{id} - document with its pagos
pub async fn documento(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DocumentoCxpDetalle>>> {
    user.require_backoffice()?;
    let documento = documento_cxp::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DocumentoNotFound))?;
    let pagos = documento_cxp::find_pagos(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(DocumentoCxpDetalle {
        documento,
        pagos,
    })))
}

/// POST /api/cxp/documentos/{id}/pagos - apply a disbursement
pub async fn aplicar_pago(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<PagoCreate>,
) -> AppResult<Json<ApiResponse<DocumentoCxpDetalle>>> {
    user.require_backoffice()?;
    let (documento, _pago) = state.billing.aplicar_pago(id, payload, user.id).await?;
    let pagos = documento_cxp::find_pagos(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(DocumentoCxpDetalle {
        documento,
        pagos,
    })))
}

/// POST /api/cxp/documentos/{id}/anular - void and release the consumos
pub async fn anular(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DocumentoCxp>>> {
    user.require_backoffice()?;
    let documento = state.billing.anular_documento_cxp(id).await?;
    Ok(Json(ApiResponse::success(documento)))
}
