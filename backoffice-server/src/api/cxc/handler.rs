//! CxC handlers
//!
//! Empresa-scoped reads are open to the Empleador of that empresa; every
//! mutation (consolidar, cobros, anular, refinanciar) is back-office only.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{
    Cobro, CobroCreate, ConsolidarRequest, DocumentoCxc, DocumentoCxcView, PreviewCxc,
    ResumenCxcEmpresa,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::documento_cxc;
use crate::utils::{time, AppResult};

/// Document detail: the aged view plus its payment history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentoCxcDetalle {
    #[serde(flatten)]
    pub view: DocumentoCxcView,
    pub cobros: Vec<Cobro>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodoQuery {
    pub desde: String,
    pub hasta: String,
}

fn aged(state: &ServerState, documento: DocumentoCxc) -> DocumentoCxcView {
    let (dias_vencido, rango_antiguedad) = state.billing.clasificar(documento.fecha_vencimiento);
    DocumentoCxcView {
        documento,
        dias_vencido,
        rango_antiguedad,
    }
}

/// GET /api/cxc/empresas - per-empresa receivable position
pub async fn resumen(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<ResumenCxcEmpresa>>>> {
    user.require_backoffice()?;
    let resumen = documento_cxc::resumen_por_empresa(&state.pool).await?;
    Ok(Json(ApiResponse::success(resumen)))
}

/// GET /api/cxc/empresas/{id}/documentos - the empresa's documentos, aged
pub async fn documentos(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DocumentoCxcView>>>> {
    user.require_empresa_access(id)?;
    let documentos = documento_cxc::find_by_empresa(&state.pool, id).await?;
    let vistas = documentos.into_iter().map(|d| aged(&state, d)).collect();
    Ok(Json(ApiResponse::success(vistas)))
}

/// GET /api/cxc/empresas/{id}/preview-consolidado?desde&hasta
pub async fn preview(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Query(query): Query<PeriodoQuery>,
) -> AppResult<Json<ApiResponse<PreviewCxc>>> {
    user.require_backoffice()?;
    let desde = time::parse_date(&query.desde)?;
    let hasta = time::parse_date(&query.hasta)?;
    let preview = state.billing.preview_cxc(id, desde, hasta).await?;
    Ok(Json(ApiResponse::success(preview)))
}

/// POST /api/cxc/empresas/{id}/consolidar - emit a CxC documento for the period
pub async fn consolidar(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ConsolidarRequest>,
) -> AppResult<Json<ApiResponse<DocumentoCxcView>>> {
    user.require_backoffice()?;
    let desde = time::parse_date(&payload.periodo_desde)?;
    let hasta = time::parse_date(&payload.periodo_hasta)?;
    let documento = state
        .billing
        .consolidar_cxc(id, desde, hasta, payload.dias_para_pagar)
        .await?;
    Ok(Json(ApiResponse::success(aged(&state, documento))))
}

/// GET /api/cxc/documentos/{id} - aged document with its cobros
pub async fn documento(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DocumentoCxcDetalle>>> {
    let documento = documento_cxc::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DocumentoNotFound))?;
    user.require_empresa_access(documento.empresa_id)?;
    let cobros = documento_cxc::find_cobros(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(DocumentoCxcDetalle {
        view: aged(&state, documento),
        cobros,
    })))
}

/// POST /api/cxc/documentos/{id}/cobros - apply a collection
pub async fn aplicar_cobro(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<CobroCreate>,
) -> AppResult<Json<ApiResponse<DocumentoCxcDetalle>>> {
    user.require_backoffice()?;
    let (documento, _cobro) = state.billing.aplicar_cobro(id, payload, user.id).await?;
    let cobros = documento_cxc::find_cobros(&state.pool, id).await?;
    Ok(Json(ApiResponse::success(DocumentoCxcDetalle {
        view: aged(&state, documento),
        cobros,
    })))
}

/// POST /api/cxc/documentos/{id}/anular - void and release the consumos
pub async fn anular(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DocumentoCxcView>>> {
    user.require_backoffice()?;
    let documento = state.billing.anular_documento_cxc(id).await?;
    Ok(Json(ApiResponse::success(aged(&state, documento))))
}

/// POST /api/cxc/documentos/{id}/refinanciar - close as refinanced,
/// consumos stay attached
pub async fn refinanciar(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DocumentoCxcView>>> {
    user.require_backoffice()?;
    let documento = state.billing.refinanciar_documento_cxc(id).await?;
    Ok(Json(ApiResponse::success(aged(&state, documento))))
}
