//! DocumentoCxp Repository
//!
//! Read side of the merchant payables, mirror of the CxC module with the
//! commission columns in play.

use super::RepoResult;
use shared::models::{DocumentoCxp, Pago, ResumenCxpProveedor};
use sqlx::SqlitePool;

const COLS: &str = "id, numero, proveedor_id, periodo_desde, periodo_hasta, fecha_emision, monto_bruto, porcentaje_comision, monto_comision, monto_total, monto_pagado, monto_pendiente, cantidad_consumos, cantidad_tiendas, estado, created_at, updated_at";

const PAGO_COLS: &str = "id, documento_id, monto, metodo_pago, referencia, banco_origen, cuenta_destino, notas, registrado_por, fecha";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DocumentoCxp>> {
    let documento = sqlx::query_as::<_, DocumentoCxp>(&format!(
        "SELECT {COLS} FROM documento_cxp WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(documento)
}

pub async fn find_by_proveedor(
    pool: &SqlitePool,
    proveedor_id: i64,
) -> RepoResult<Vec<DocumentoCxp>> {
    let documentos = sqlx::query_as::<_, DocumentoCxp>(&format!(
        "SELECT {COLS} FROM documento_cxp WHERE proveedor_id = ? ORDER BY fecha_emision DESC, id DESC"
    ))
    .bind(proveedor_id)
    .fetch_all(pool)
    .await?;
    Ok(documentos)
}

pub async fn find_abiertos(pool: &SqlitePool) -> RepoResult<Vec<DocumentoCxp>> {
    let documentos = sqlx::query_as::<_, DocumentoCxp>(&format!(
        "SELECT {COLS} FROM documento_cxp WHERE estado IN (0, 1) ORDER BY fecha_emision"
    ))
    .fetch_all(pool)
    .await?;
    Ok(documentos)
}

/// Next sequential numero for the year, e.g. "CXP-2025-000042", derived from
/// the highest suffix already taken
pub async fn next_numero<'e, E>(executor: E, year: i32) -> RepoResult<String>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let max_suffix: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(CAST(SUBSTR(numero, -6) AS INTEGER)) FROM documento_cxp WHERE numero LIKE ?",
    )
    .bind(format!("CXP-{year}-%"))
    .fetch_one(executor)
    .await?;
    Ok(format!("CXP-{year}-{:06}", max_suffix.unwrap_or(0) + 1))
}

pub async fn find_pagos(pool: &SqlitePool, documento_id: i64) -> RepoResult<Vec<Pago>> {
    let pagos = sqlx::query_as::<_, Pago>(&format!(
        "SELECT {PAGO_COLS} FROM pago WHERE documento_id = ? ORDER BY fecha, id"
    ))
    .bind(documento_id)
    .fetch_all(pool)
    .await?;
    Ok(pagos)
}

/// Per-proveedor payables aggregate for the CxP landing list
pub async fn resumen_por_proveedor(pool: &SqlitePool) -> RepoResult<Vec<ResumenCxpProveedor>> {
    let resumen = sqlx::query_as::<_, ResumenCxpProveedor>(
        "SELECT p.id AS proveedor_id, p.nombre AS proveedor_nombre, \
            p.porcentaje_comision, \
            (SELECT COUNT(*) FROM documento_cxp d \
                WHERE d.proveedor_id = p.id AND d.estado IN (0, 1)) AS documentos_abiertos, \
            (SELECT COALESCE(SUM(d.monto_pendiente), 0.0) FROM documento_cxp d \
                WHERE d.proveedor_id = p.id AND d.estado IN (0, 1)) AS monto_pendiente, \
            (SELECT COUNT(*) FROM consumo c \
                WHERE c.proveedor_id = p.id AND c.reversado = 0 \
                  AND c.documento_cxp_id IS NULL) AS consumos_sin_facturar, \
            (SELECT COALESCE(SUM(c.monto), 0.0) FROM consumo c \
                WHERE c.proveedor_id = p.id AND c.reversado = 0 \
                  AND c.documento_cxp_id IS NULL) AS monto_sin_facturar \
         FROM proveedor p WHERE p.is_active = 1 ORDER BY p.nombre",
    )
    .fetch_all(pool)
    .await?;
    Ok(resumen)
}
