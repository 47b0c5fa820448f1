//! Consolidation: consumos into CxC/CxP documentos
//!
//! Preview is a pure read over the eligible set; commit stamps every
//! eligible consumo with the new documento id inside one transaction, under
//! the payer lock. Eligible means: payer match, not reversed, within the
//! inclusive period, not attached to any documento of that family
//! (anulación detaches, so released consumos show up here again).

use chrono::{Datelike, NaiveDate};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DocumentoCxc, DocumentoCxp, EstadoDocumento, PreviewCxc, PreviewCxp};

use super::{money, BillingService};
use crate::db::repository::{documento_cxc, documento_cxp, empresa, proveedor};
use crate::utils::time;

const DAY_MILLIS: i64 = 24 * 3600 * 1000;

/// Attempts before giving up when concurrent emitters for different payers
/// collide on the numero sequence
const NUMERO_RETRIES: usize = 3;

/// Eligible-set aggregate: count, distinct payees, gross sum
type Elegibles = (i64, i64, f64);

impl BillingService {
    /// Preview a CxC consolidation without side effects
    pub async fn preview_cxc(
        &self,
        empresa_id: i64,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> AppResult<PreviewCxc> {
        time::validate_range(desde, hasta)?;
        if empresa::find_by_id(&self.pool, empresa_id).await?.is_none() {
            return Err(AppError::business_rule(
                ErrorCode::EmpresaNotFound,
                format!("Empresa {empresa_id} not found"),
            ));
        }

        let (cantidad, empleados, suma) = self
            .elegibles_cxc(&self.pool, empresa_id, desde, hasta)
            .await?;
        Ok(PreviewCxc {
            empresa_id,
            periodo_desde: desde.to_string(),
            periodo_hasta: hasta.to_string(),
            cantidad_consumos: cantidad,
            cantidad_empleados: empleados,
            monto_total: money::round2_f64(suma),
        })
    }

    /// Preview a CxP consolidation, including the commission split at the
    /// proveedor's current percentage
    pub async fn preview_cxp(
        &self,
        proveedor_id: i64,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> AppResult<PreviewCxp> {
        time::validate_range(desde, hasta)?;
        let proveedor = proveedor::find_by_id(&self.pool, proveedor_id)
            .await?
            .ok_or_else(|| {
                AppError::business_rule(
                    ErrorCode::ProveedorNotFound,
                    format!("Proveedor {proveedor_id} not found"),
                )
            })?;

        let (cantidad, tiendas, bruto) = self
            .elegibles_cxp(&self.pool, proveedor_id, desde, hasta)
            .await?;
        let monto_bruto = money::round2_f64(bruto);
        let (monto_comision, monto_total) =
            money::comision(monto_bruto, proveedor.porcentaje_comision);
        Ok(PreviewCxp {
            proveedor_id,
            periodo_desde: desde.to_string(),
            periodo_hasta: hasta.to_string(),
            cantidad_consumos: cantidad,
            cantidad_tiendas: tiendas,
            monto_bruto,
            porcentaje_comision: proveedor.porcentaje_comision,
            monto_comision,
            monto_total,
        })
    }

    /// Consolidate an empresa's eligible consumos into a new CxC documento
    pub async fn consolidar_cxc(
        &self,
        empresa_id: i64,
        desde: NaiveDate,
        hasta: NaiveDate,
        dias_para_pagar: Option<i32>,
    ) -> AppResult<DocumentoCxc> {
        time::validate_range(desde, hasta)?;
        let empresa = empresa::find_by_id(&self.pool, empresa_id)
            .await?
            .ok_or_else(|| {
                AppError::business_rule(
                    ErrorCode::EmpresaNotFound,
                    format!("Empresa {empresa_id} not found"),
                )
            })?;
        let dias = dias_para_pagar.unwrap_or(empresa.dias_para_pagar);
        if dias <= 0 {
            return Err(AppError::validation("diasParaPagar must be positive"));
        }

        let lock = self.payer_lock(empresa_id);
        let _guard = lock.lock().await;

        let desde_ms = time::day_start_millis(desde, self.timezone);
        let hasta_ms = time::day_end_millis(hasta, self.timezone);

        for _ in 0..NUMERO_RETRIES {
            let mut tx = self.pool.begin().await?;

            let (cantidad, empleados, suma): Elegibles = sqlx::query_as(
                "SELECT COUNT(*), COUNT(DISTINCT empleado_id), COALESCE(SUM(monto), 0.0) \
                 FROM consumo \
                 WHERE empresa_id = ? AND reversado = 0 AND documento_cxc_id IS NULL \
                   AND fecha >= ? AND fecha < ?",
            )
            .bind(empresa_id)
            .bind(desde_ms)
            .bind(hasta_ms)
            .fetch_one(&mut *tx)
            .await?;

            if cantidad == 0 {
                return Err(AppError::business_rule(
                    ErrorCode::NadaQueConsolidar,
                    format!("No eligible consumos for empresa {empresa_id} between {desde} and {hasta}"),
                ));
            }

            let now = shared::util::now_millis();
            let numero = documento_cxc::next_numero(&mut *tx, self.year_of(now)).await?;
            let monto_total = money::round2_f64(suma);
            let documento = DocumentoCxc {
                id: shared::util::snowflake_id(),
                numero,
                empresa_id,
                periodo_desde: desde_ms,
                periodo_hasta: hasta_ms,
                fecha_emision: now,
                fecha_vencimiento: now + (dias as i64) * DAY_MILLIS,
                monto_total,
                monto_pagado: 0.0,
                monto_pendiente: monto_total,
                cantidad_consumos: cantidad,
                cantidad_empleados: empleados,
                estado: EstadoDocumento::Pendiente,
                credito_restaurado: false,
                created_at: now,
                updated_at: now,
            };

            let inserted = sqlx::query(
                "INSERT INTO documento_cxc (id, numero, empresa_id, periodo_desde, periodo_hasta, fecha_emision, fecha_vencimiento, monto_total, monto_pagado, monto_pendiente, cantidad_consumos, cantidad_empleados, estado, credito_restaurado, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, 0, 0, ?, ?)",
            )
            .bind(documento.id)
            .bind(&documento.numero)
            .bind(empresa_id)
            .bind(desde_ms)
            .bind(hasta_ms)
            .bind(now)
            .bind(documento.fecha_vencimiento)
            .bind(monto_total)
            .bind(monto_total)
            .bind(cantidad)
            .bind(empleados)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await;
            match inserted {
                // Another emitter took the numero; re-read the sequence
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => continue,
                other => {
                    other?;
                }
            }

            let stamped = sqlx::query(
                "UPDATE consumo SET documento_cxc_id = ? \
                 WHERE empresa_id = ? AND reversado = 0 AND documento_cxc_id IS NULL \
                   AND fecha >= ? AND fecha < ?",
            )
            .bind(documento.id)
            .bind(empresa_id)
            .bind(desde_ms)
            .bind(hasta_ms)
            .execute(&mut *tx)
            .await?;

            if stamped.rows_affected() != cantidad as u64 {
                return Err(AppError::internal(
                    "Eligible consumo set changed during consolidation",
                ));
            }

            tx.commit().await?;
            tracing::info!(
                numero = %documento.numero,
                empresa_id,
                consumos = cantidad,
                monto = monto_total,
                "CxC documento emitted"
            );
            return Ok(documento);
        }
        Err(AppError::internal("Could not allocate a CxC numero"))
    }

    /// Consolidate a proveedor's eligible consumos into a new CxP documento,
    /// snapshotting its commission percentage
    pub async fn consolidar_cxp(
        &self,
        proveedor_id: i64,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> AppResult<DocumentoCxp> {
        time::validate_range(desde, hasta)?;
        let proveedor = proveedor::find_by_id(&self.pool, proveedor_id)
            .await?
            .ok_or_else(|| {
                AppError::business_rule(
                    ErrorCode::ProveedorNotFound,
                    format!("Proveedor {proveedor_id} not found"),
                )
            })?;

        let lock = self.payer_lock(proveedor_id);
        let _guard = lock.lock().await;

        let desde_ms = time::day_start_millis(desde, self.timezone);
        let hasta_ms = time::day_end_millis(hasta, self.timezone);

        for _ in 0..NUMERO_RETRIES {
            let mut tx = self.pool.begin().await?;

            let (cantidad, tiendas, bruto): Elegibles = sqlx::query_as(
                "SELECT COUNT(*), COUNT(DISTINCT tienda_id), COALESCE(SUM(monto), 0.0) \
                 FROM consumo \
                 WHERE proveedor_id = ? AND reversado = 0 AND documento_cxp_id IS NULL \
                   AND fecha >= ? AND fecha < ?",
            )
            .bind(proveedor_id)
            .bind(desde_ms)
            .bind(hasta_ms)
            .fetch_one(&mut *tx)
            .await?;

            if cantidad == 0 {
                return Err(AppError::business_rule(
                    ErrorCode::NadaQueConsolidar,
                    format!(
                        "No eligible consumos for proveedor {proveedor_id} between {desde} and {hasta}"
                    ),
                ));
            }

            let now = shared::util::now_millis();
            let numero = documento_cxp::next_numero(&mut *tx, self.year_of(now)).await?;
            let monto_bruto = money::round2_f64(bruto);
            let (monto_comision, monto_total) =
                money::comision(monto_bruto, proveedor.porcentaje_comision);
            let documento = DocumentoCxp {
                id: shared::util::snowflake_id(),
                numero,
                proveedor_id,
                periodo_desde: desde_ms,
                periodo_hasta: hasta_ms,
                fecha_emision: now,
                monto_bruto,
                porcentaje_comision: proveedor.porcentaje_comision,
                monto_comision,
                monto_total,
                monto_pagado: 0.0,
                monto_pendiente: monto_total,
                cantidad_consumos: cantidad,
                cantidad_tiendas: tiendas,
                estado: EstadoDocumento::Pendiente,
                created_at: now,
                updated_at: now,
            };

            let inserted = sqlx::query(
                "INSERT INTO documento_cxp (id, numero, proveedor_id, periodo_desde, periodo_hasta, fecha_emision, monto_bruto, porcentaje_comision, monto_comision, monto_total, monto_pagado, monto_pendiente, cantidad_consumos, cantidad_tiendas, estado, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, 0, ?, ?)",
            )
            .bind(documento.id)
            .bind(&documento.numero)
            .bind(proveedor_id)
            .bind(desde_ms)
            .bind(hasta_ms)
            .bind(now)
            .bind(monto_bruto)
            .bind(documento.porcentaje_comision)
            .bind(monto_comision)
            .bind(monto_total)
            .bind(monto_total)
            .bind(cantidad)
            .bind(tiendas)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await;
            match inserted {
                // Another emitter took the numero; re-read the sequence
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => continue,
                other => {
                    other?;
                }
            }

            let stamped = sqlx::query(
                "UPDATE consumo SET documento_cxp_id = ? \
                 WHERE proveedor_id = ? AND reversado = 0 AND documento_cxp_id IS NULL \
                   AND fecha >= ? AND fecha < ?",
            )
            .bind(documento.id)
            .bind(proveedor_id)
            .bind(desde_ms)
            .bind(hasta_ms)
            .execute(&mut *tx)
            .await?;

            if stamped.rows_affected() != cantidad as u64 {
                return Err(AppError::internal(
                    "Eligible consumo set changed during consolidation",
                ));
            }

            tx.commit().await?;
            tracing::info!(
                numero = %documento.numero,
                proveedor_id,
                consumos = cantidad,
                bruto = monto_bruto,
                neto = monto_total,
                "CxP documento emitted"
            );
            return Ok(documento);
        }
        Err(AppError::internal("Could not allocate a CxP numero"))
    }

    async fn elegibles_cxc(
        &self,
        pool: &sqlx::SqlitePool,
        empresa_id: i64,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> AppResult<Elegibles> {
        let row: Elegibles = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT empleado_id), COALESCE(SUM(monto), 0.0) \
             FROM consumo \
             WHERE empresa_id = ? AND reversado = 0 AND documento_cxc_id IS NULL \
               AND fecha >= ? AND fecha < ?",
        )
        .bind(empresa_id)
        .bind(time::day_start_millis(desde, self.timezone))
        .bind(time::day_end_millis(hasta, self.timezone))
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    async fn elegibles_cxp(
        &self,
        pool: &sqlx::SqlitePool,
        proveedor_id: i64,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> AppResult<Elegibles> {
        let row: Elegibles = sqlx::query_as(
            "SELECT COUNT(*), COUNT(DISTINCT tienda_id), COALESCE(SUM(monto), 0.0) \
             FROM consumo \
             WHERE proveedor_id = ? AND reversado = 0 AND documento_cxp_id IS NULL \
               AND fecha >= ? AND fecha < ?",
        )
        .bind(proveedor_id)
        .bind(time::day_start_millis(desde, self.timezone))
        .bind(time::day_end_millis(hasta, self.timezone))
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    fn year_of(&self, millis: i64) -> i32 {
        chrono::DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&self.timezone).year())
            .unwrap_or_else(|| time::today(self.timezone).year())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use crate::utils::time;
    use shared::error::ErrorCode;
    use shared::models::EstadoDocumento;

    #[tokio::test]
    async fn test_preview_cxc_is_idempotent() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 600.0).await;
        testutil::consumo(svc.pool(), &fx, 400.0).await;

        let hoy = time::today(svc.timezone());
        let first = svc.preview_cxc(fx.empresa_id, hoy, hoy).await.unwrap();
        let second = svc.preview_cxc(fx.empresa_id, hoy, hoy).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.cantidad_consumos, 2);
        assert_eq!(first.cantidad_empleados, 1);
        assert_eq!(first.monto_total, 1000.0);
    }

    #[tokio::test]
    async fn test_consolidar_cxc_stamps_and_blocks_double_billing() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 600.0).await;
        testutil::consumo(svc.pool(), &fx, 400.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        assert_eq!(doc.monto_total, 1000.0);
        assert_eq!(doc.monto_pendiente, 1000.0);
        assert_eq!(doc.estado, EstadoDocumento::Pendiente);
        assert!(doc.numero.starts_with("CXC-"));

        // The same period has nothing left to consolidate
        let err = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NadaQueConsolidar);

        let preview = svc.preview_cxc(fx.empresa_id, hoy, hoy).await.unwrap();
        assert_eq!(preview.cantidad_consumos, 0);
        assert_eq!(preview.monto_total, 0.0);
    }

    #[tokio::test]
    async fn test_consolidar_cxp_commission_split() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 600.0).await;
        testutil::consumo(svc.pool(), &fx, 400.0).await;

        let hoy = time::today(svc.timezone());
        let preview = svc.preview_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();
        assert_eq!(preview.monto_bruto, 1000.0);
        assert_eq!(preview.monto_comision, 80.0);
        assert_eq!(preview.monto_total, 920.0);

        let doc = svc.consolidar_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();
        assert_eq!(doc.monto_bruto, preview.monto_bruto);
        assert_eq!(doc.monto_comision, preview.monto_comision);
        assert_eq!(doc.monto_total, preview.monto_total);
        assert_eq!(doc.cantidad_tiendas, 1);
        assert!(doc.numero.starts_with("CXP-"));
    }

    #[tokio::test]
    async fn test_invalid_range_rejected() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let hoy = time::today(svc.timezone());
        let ayer = hoy.pred_opt().unwrap();

        let err = svc.preview_cxc(fx.empresa_id, hoy, ayer).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateRange);
    }

    #[tokio::test]
    async fn test_unknown_payer_rejected() {
        let svc = testutil::service().await;
        testutil::seed(svc.pool()).await;
        let hoy = time::today(svc.timezone());

        let err = svc.preview_cxc(999, hoy, hoy).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmpresaNotFound);
        let err = svc.consolidar_cxp(999, hoy, hoy).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProveedorNotFound);
    }
}
