//! Consumo reversal
//!
//! A reversal undoes the purchase: the empleado's credit comes back and the
//! consumo drops out of balances and billing eligibility, while the row
//! stays for history. Once any attached documento has progressed past
//! Pendiente the reversal is refused; on a still-Pendiente documento the
//! totals are recomputed from the surviving consumos.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Consumo, EstadoDocumento};

use super::{money, BillingService};
use crate::db::repository::{consumo, empleado};

/// Both attached documentos must still be Pendiente. Runs on the transaction
/// connection while the documento locks are held, so a cobro or pago cannot
/// commit a Pendiente -> Parcial transition between the check and the write.
async fn check_reversable(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    registro: &Consumo,
) -> AppResult<()> {
    if let Some(doc_id) = registro.documento_cxc_id {
        let (numero, estado): (String, EstadoDocumento) =
            sqlx::query_as("SELECT numero, estado FROM documento_cxc WHERE id = ?")
                .bind(doc_id)
                .fetch_one(&mut **tx)
                .await?;
        if estado != EstadoDocumento::Pendiente {
            return Err(AppError::business_rule(
                ErrorCode::ConsumoYaFacturado,
                format!("Consumo is billed on documento {numero} ({})", estado.label()),
            ));
        }
    }
    if let Some(doc_id) = registro.documento_cxp_id {
        let (numero, estado): (String, EstadoDocumento) =
            sqlx::query_as("SELECT numero, estado FROM documento_cxp WHERE id = ?")
                .bind(doc_id)
                .fetch_one(&mut **tx)
                .await?;
        if estado != EstadoDocumento::Pendiente {
            return Err(AppError::business_rule(
                ErrorCode::ConsumoYaFacturado,
                format!("Consumo is settled on documento {numero} ({})", estado.label()),
            ));
        }
    }
    Ok(())
}

impl BillingService {
    pub async fn reversar_consumo(&self, consumo_id: i64) -> AppResult<Consumo> {
        loop {
            let registro = consumo::find_by_id(&self.pool, consumo_id)
                .await?
                .ok_or_else(|| {
                    AppError::business_rule(
                        ErrorCode::ConsumoNotFound,
                        format!("Consumo {consumo_id} not found"),
                    )
                })?;
            if registro.reversado {
                return Err(AppError::business_rule(
                    ErrorCode::ConsumoAlreadyReversado,
                    format!("Consumo {consumo_id} is already reversed"),
                ));
            }

            // Serialize with payment application on the attached documentos,
            // locks taken in id order
            let mut doc_ids: Vec<i64> = [registro.documento_cxc_id, registro.documento_cxp_id]
                .into_iter()
                .flatten()
                .collect();
            doc_ids.sort_unstable();
            let locks: Vec<_> = doc_ids.iter().map(|id| self.doc_lock(*id)).collect();
            let mut guards = Vec::with_capacity(locks.len());
            for lock in &locks {
                guards.push(lock.lock().await);
            }

            let now = shared::util::now_millis();
            let mut tx = self.pool.begin().await?;

            // Re-read under the locks. A consolidation may have stamped the
            // consumo onto a new documento while they were being acquired;
            // that documento's lock is not held, so start over.
            let registro = consumo::find_by_id(&mut *tx, consumo_id)
                .await?
                .ok_or_else(|| AppError::internal("Consumo vanished during reversal"))?;
            if registro.reversado {
                return Err(AppError::business_rule(
                    ErrorCode::ConsumoAlreadyReversado,
                    format!("Consumo {consumo_id} is already reversed"),
                ));
            }
            let locked: Vec<i64> = doc_ids;
            let mut actual: Vec<i64> = [registro.documento_cxc_id, registro.documento_cxp_id]
                .into_iter()
                .flatten()
                .collect();
            actual.sort_unstable();
            if actual != locked {
                continue;
            }

            check_reversable(&mut tx, &registro).await?;

            sqlx::query(
                "UPDATE consumo SET reversado = 1, reversado_utc = ? WHERE id = ?",
            )
            .bind(now)
            .bind(consumo_id)
            .execute(&mut *tx)
            .await?;

            empleado::restaurar_credito(&mut *tx, registro.empleado_id, registro.monto).await?;

            self.recompute_documentos(&mut tx, &registro, now).await?;

            tx.commit().await?;
            tracing::info!(consumo_id, monto = registro.monto, "consumo reversed");

            return consumo::find_by_id(&self.pool, consumo_id)
                .await?
                .ok_or_else(|| AppError::internal("Consumo vanished during reversal"));
        }
    }

    /// Rewrite the attached documentos' totals from the surviving consumos.
    /// Only reached while both documentos are Pendiente, so monto_pagado is
    /// zero and monto_pendiente equals the recomputed total.
    async fn recompute_documentos(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        registro: &Consumo,
        now: i64,
    ) -> AppResult<()> {
        if let Some(doc_id) = registro.documento_cxc_id {
            let (cantidad, empleados, suma): (i64, i64, f64) = sqlx::query_as(
                "SELECT COUNT(*), COUNT(DISTINCT empleado_id), COALESCE(SUM(monto), 0.0) \
                 FROM consumo WHERE documento_cxc_id = ? AND reversado = 0",
            )
            .bind(doc_id)
            .fetch_one(&mut **tx)
            .await?;
            let total = money::round2_f64(suma);
            sqlx::query(
                "UPDATE documento_cxc SET monto_total = ?, monto_pendiente = ?, \
                 cantidad_consumos = ?, cantidad_empleados = ?, updated_at = ? WHERE id = ?",
            )
            .bind(total)
            .bind(total)
            .bind(cantidad)
            .bind(empleados)
            .bind(now)
            .bind(doc_id)
            .execute(&mut **tx)
            .await?;
        }

        if let Some(doc_id) = registro.documento_cxp_id {
            let (cantidad, tiendas, suma): (i64, i64, f64) = sqlx::query_as(
                "SELECT COUNT(*), COUNT(DISTINCT tienda_id), COALESCE(SUM(monto), 0.0) \
                 FROM consumo WHERE documento_cxp_id = ? AND reversado = 0",
            )
            .bind(doc_id)
            .fetch_one(&mut **tx)
            .await?;
            let porcentaje: f64 =
                sqlx::query_scalar("SELECT porcentaje_comision FROM documento_cxp WHERE id = ?")
                    .bind(doc_id)
                    .fetch_one(&mut **tx)
                    .await?;
            let bruto = money::round2_f64(suma);
            let (comision, neto) = money::comision(bruto, porcentaje);
            sqlx::query(
                "UPDATE documento_cxp SET monto_bruto = ?, monto_comision = ?, monto_total = ?, \
                 monto_pendiente = ?, cantidad_consumos = ?, cantidad_tiendas = ?, updated_at = ? \
                 WHERE id = ?",
            )
            .bind(bruto)
            .bind(comision)
            .bind(neto)
            .bind(neto)
            .bind(cantidad)
            .bind(tiendas)
            .bind(now)
            .bind(doc_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use crate::db::repository;
    use crate::utils::time;
    use shared::error::ErrorCode;
    use shared::models::{CobroCreate, MetodoPago};

    #[tokio::test]
    async fn test_reversal_restores_credit_and_leaves_history() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let id = testutil::consumo(svc.pool(), &fx, 750.0).await;

        let reversed = svc.reversar_consumo(id).await.unwrap();
        assert!(reversed.reversado);
        assert!(reversed.reversado_utc.is_some());

        let empleado = repository::empleado::find_by_id(svc.pool(), fx.empleado_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(empleado.saldo_disponible, 5000.0);
    }

    #[tokio::test]
    async fn test_reversal_excluded_from_preview() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 600.0).await;
        let reversado = testutil::consumo(svc.pool(), &fx, 400.0).await;
        svc.reversar_consumo(reversado).await.unwrap();

        let hoy = time::today(svc.timezone());
        let preview = svc.preview_cxc(fx.empresa_id, hoy, hoy).await.unwrap();
        assert_eq!(preview.cantidad_consumos, 1);
        assert_eq!(preview.monto_total, 600.0);
    }

    #[tokio::test]
    async fn test_double_reversal_rejected() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let id = testutil::consumo(svc.pool(), &fx, 100.0).await;
        svc.reversar_consumo(id).await.unwrap();

        let err = svc.reversar_consumo(id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConsumoAlreadyReversado);
    }

    #[tokio::test]
    async fn test_reversal_on_pendiente_documento_recomputes_totals() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 600.0).await;
        let id = testutil::consumo(svc.pool(), &fx, 400.0).await;

        let hoy = time::today(svc.timezone());
        let cxc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        let cxp = svc.consolidar_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();

        svc.reversar_consumo(id).await.unwrap();

        let cxc = repository::documento_cxc::find_by_id(svc.pool(), cxc.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cxc.monto_total, 600.0);
        assert_eq!(cxc.monto_pendiente, 600.0);
        assert_eq!(cxc.cantidad_consumos, 1);

        let cxp = repository::documento_cxp::find_by_id(svc.pool(), cxp.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cxp.monto_bruto, 600.0);
        assert_eq!(cxp.monto_comision, 48.0);
        assert_eq!(cxp.monto_total, 552.0);
    }

    #[tokio::test]
    async fn test_reversal_blocked_after_document_progresses() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let id = testutil::consumo(svc.pool(), &fx, 1000.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        svc.aplicar_cobro(
            doc.id,
            CobroCreate {
                monto: 100.0,
                metodo_pago: MetodoPago::Efectivo,
                referencia: None,
                banco_origen: None,
                cuenta_destino: None,
                notas: None,
            },
            testutil::USUARIO_TEST,
        )
        .await
        .unwrap();

        let err = svc.reversar_consumo(id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConsumoYaFacturado);
    }

    #[tokio::test]
    async fn test_reversal_guard_reads_estado_under_documento_lock() {
        let svc = std::sync::Arc::new(testutil::service().await);
        let fx = testutil::seed(svc.pool()).await;
        let id = testutil::consumo(svc.pool(), &fx, 1000.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();

        // Hold the documento lock so the reversal parks on it after its
        // initial consumo fetch
        let lock = svc.doc_lock(doc.id);
        let guard = lock.lock().await;

        let task = tokio::spawn({
            let svc = svc.clone();
            async move { svc.reversar_consumo(id).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // A cobro lands while the reversal is waiting
        sqlx::query(
            "UPDATE documento_cxc SET estado = ?, monto_pagado = 100.0, monto_pendiente = 900.0 \
             WHERE id = ?",
        )
        .bind(shared::models::EstadoDocumento::Parcial)
        .bind(doc.id)
        .execute(svc.pool())
        .await
        .unwrap();
        drop(guard);

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConsumoYaFacturado);

        // Totals untouched, consumo still live
        let doc = repository::documento_cxc::find_by_id(svc.pool(), doc.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.monto_pagado, 100.0);
        assert_eq!(doc.monto_pendiente, 900.0);
        let consumo = repository::consumo::find_by_id(svc.pool(), id)
            .await
            .unwrap()
            .unwrap();
        assert!(!consumo.reversado);
    }

    #[tokio::test]
    async fn test_reversal_unknown_consumo() {
        let svc = testutil::service().await;
        testutil::seed(svc.pool()).await;
        let err = svc.reversar_consumo(12345).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConsumoNotFound);
    }
}
