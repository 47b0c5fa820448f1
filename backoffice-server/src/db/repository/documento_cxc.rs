//! DocumentoCxc Repository
//!
//! Read side of the employer receivables. All writes (consolidation, payment
//! application, anulación, refinanciamiento) go through the billing engine in
//! a transaction; this module serves the listings, detail views and the
//! numero sequence.

use super::RepoResult;
use shared::models::{Cobro, DocumentoCxc, ResumenCxcEmpresa};
use sqlx::SqlitePool;

const COLS: &str = "id, numero, empresa_id, periodo_desde, periodo_hasta, fecha_emision, fecha_vencimiento, monto_total, monto_pagado, monto_pendiente, cantidad_consumos, cantidad_empleados, estado, credito_restaurado, created_at, updated_at";

const COBRO_COLS: &str = "id, documento_id, monto, metodo_pago, referencia, banco_origen, cuenta_destino, notas, registrado_por, fecha";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DocumentoCxc>> {
    let documento = sqlx::query_as::<_, DocumentoCxc>(&format!(
        "SELECT {COLS} FROM documento_cxc WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(documento)
}

pub async fn find_by_empresa(pool: &SqlitePool, empresa_id: i64) -> RepoResult<Vec<DocumentoCxc>> {
    let documentos = sqlx::query_as::<_, DocumentoCxc>(&format!(
        "SELECT {COLS} FROM documento_cxc WHERE empresa_id = ? ORDER BY fecha_emision DESC, id DESC"
    ))
    .bind(empresa_id)
    .fetch_all(pool)
    .await?;
    Ok(documentos)
}

/// Documentos still accepting payments (Pendiente or Parcial). Feeds the
/// aging report.
pub async fn find_abiertos(pool: &SqlitePool) -> RepoResult<Vec<DocumentoCxc>> {
    let documentos = sqlx::query_as::<_, DocumentoCxc>(&format!(
        "SELECT {COLS} FROM documento_cxc WHERE estado IN (0, 1) ORDER BY fecha_vencimiento"
    ))
    .fetch_all(pool)
    .await?;
    Ok(documentos)
}

/// Next sequential numero for the year, e.g. "CXC-2025-000042", derived from
/// the highest suffix already taken. Runs inside the consolidation
/// transaction; the UNIQUE constraint on numero backstops concurrent emitters
/// for different payers, which retry on collision.
pub async fn next_numero<'e, E>(executor: E, year: i32) -> RepoResult<String>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let max_suffix: Option<i64> = sqlx::query_scalar(
        "SELECT MAX(CAST(SUBSTR(numero, -6) AS INTEGER)) FROM documento_cxc WHERE numero LIKE ?",
    )
    .bind(format!("CXC-{year}-%"))
    .fetch_one(executor)
    .await?;
    Ok(format!("CXC-{year}-{:06}", max_suffix.unwrap_or(0) + 1))
}

pub async fn find_cobros(pool: &SqlitePool, documento_id: i64) -> RepoResult<Vec<Cobro>> {
    let cobros = sqlx::query_as::<_, Cobro>(&format!(
        "SELECT {COBRO_COLS} FROM cobro WHERE documento_id = ? ORDER BY fecha, id"
    ))
    .bind(documento_id)
    .fetch_all(pool)
    .await?;
    Ok(cobros)
}

/// Per-empresa receivables aggregate for the CxC landing list: open
/// documents plus the not-yet-billed consumo backlog
pub async fn resumen_por_empresa(pool: &SqlitePool) -> RepoResult<Vec<ResumenCxcEmpresa>> {
    let resumen = sqlx::query_as::<_, ResumenCxcEmpresa>(
        "SELECT em.id AS empresa_id, em.nombre AS empresa_nombre, \
            (SELECT COUNT(*) FROM documento_cxc d \
                WHERE d.empresa_id = em.id AND d.estado IN (0, 1)) AS documentos_abiertos, \
            (SELECT COALESCE(SUM(d.monto_pendiente), 0.0) FROM documento_cxc d \
                WHERE d.empresa_id = em.id AND d.estado IN (0, 1)) AS monto_pendiente, \
            (SELECT COUNT(*) FROM consumo c \
                WHERE c.empresa_id = em.id AND c.reversado = 0 \
                  AND c.documento_cxc_id IS NULL) AS consumos_sin_facturar, \
            (SELECT COALESCE(SUM(c.monto), 0.0) FROM consumo c \
                WHERE c.empresa_id = em.id AND c.reversado = 0 \
                  AND c.documento_cxc_id IS NULL) AS monto_sin_facturar \
         FROM empresa em WHERE em.is_active = 1 ORDER BY em.nombre",
    )
    .fetch_all(pool)
    .await?;
    Ok(resumen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::testutil;
    use crate::utils::time;

    #[tokio::test]
    async fn test_next_numero_follows_highest_suffix() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 100.0).await;
        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();

        // Renumber out of band; the sequence must continue from the highest
        // suffix, not the row count
        sqlx::query("UPDATE documento_cxc SET numero = 'CXC-2031-000040' WHERE id = ?")
            .bind(doc.id)
            .execute(svc.pool())
            .await
            .unwrap();

        let numero = next_numero(svc.pool(), 2031).await.unwrap();
        assert_eq!(numero, "CXC-2031-000041");
        let numero = next_numero(svc.pool(), 1999).await.unwrap();
        assert_eq!(numero, "CXC-1999-000001");
    }
}
