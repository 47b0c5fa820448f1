//! Payment application: cobros on CxC, pagos on CxP
//!
//! Each application runs under the per-document lock: the pending-balance
//! check, the record insert and the aggregate recompute cannot interleave
//! with a concurrent payment on the same documento. The CxC full-payment
//! transition restores each empleado's consumed credit exactly once, guarded
//! by the `credito_restaurado` flag.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Cobro, CobroCreate, DocumentoCxc, DocumentoCxp, EstadoDocumento, Pago, PagoCreate};

use super::{money, BillingService};
use crate::db::repository::{documento_cxc, documento_cxp, empleado};

fn estado_guard(estado: EstadoDocumento) -> AppResult<()> {
    match estado {
        EstadoDocumento::Pendiente | EstadoDocumento::Parcial => Ok(()),
        EstadoDocumento::Pagado => Err(AppError::business_rule(
            ErrorCode::DocumentoAlreadyPagado,
            "Documento is already fully paid",
        )),
        EstadoDocumento::Refinanciado => Err(AppError::business_rule(
            ErrorCode::DocumentoAlreadyRefinanciado,
            "Documento was refinanced",
        )),
        EstadoDocumento::Anulado => Err(AppError::business_rule(
            ErrorCode::DocumentoAlreadyAnulado,
            "Documento was voided",
        )),
    }
}

fn validate_monto(monto: f64) -> AppResult<()> {
    if monto <= 0.0 {
        return Err(AppError::business_rule(
            ErrorCode::PagoMontoInvalido,
            "Payment amount must be positive",
        ));
    }
    Ok(())
}

fn check_pendiente(monto: f64, pendiente: f64) -> AppResult<()> {
    if monto > pendiente + money::MONEY_TOLERANCE {
        return Err(AppError::business_rule(
            ErrorCode::PagoExcedeSaldoPendiente,
            format!("Payment {monto:.2} exceeds the pending balance {pendiente:.2}"),
        ));
    }
    Ok(())
}

/// New aggregate state after applying one payment
fn recompute(monto_pagado: f64, monto: f64, monto_total: f64) -> (f64, f64, EstadoDocumento) {
    let pagado = money::round2_f64(money::sum2([monto_pagado, monto]));
    if money::fully_paid(pagado, monto_total) {
        (pagado, 0.0, EstadoDocumento::Pagado)
    } else {
        let pendiente = money::to_f64(money::round2(money::dec(monto_total) - money::dec(pagado)));
        (pagado, pendiente, EstadoDocumento::Parcial)
    }
}

impl BillingService {
    /// Apply a cobro to a CxC documento
    pub async fn aplicar_cobro(
        &self,
        documento_id: i64,
        data: CobroCreate,
        registrado_por: i64,
    ) -> AppResult<(DocumentoCxc, Cobro)> {
        validate_monto(data.monto)?;

        let lock = self.doc_lock(documento_id);
        let guard = lock.lock().await;

        let mut documento = documento_cxc::find_by_id(&self.pool, documento_id)
            .await?
            .ok_or_else(|| {
                AppError::business_rule(
                    ErrorCode::DocumentoNotFound,
                    format!("Documento CxC {documento_id} not found"),
                )
            })?;
        if let Err(err) = estado_guard(documento.estado) {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
            return Err(err);
        }
        check_pendiente(data.monto, documento.monto_pendiente)?;

        let now = shared::util::now_millis();
        let cobro = Cobro {
            id: shared::util::snowflake_id(),
            documento_id,
            monto: money::round2_f64(data.monto),
            metodo_pago: data.metodo_pago,
            referencia: data.referencia,
            banco_origen: data.banco_origen,
            cuenta_destino: data.cuenta_destino,
            notas: data.notas,
            registrado_por,
            fecha: now,
        };
        let (pagado, pendiente, estado) =
            recompute(documento.monto_pagado, cobro.monto, documento.monto_total);

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO cobro (id, documento_id, monto, metodo_pago, referencia, banco_origen, cuenta_destino, notas, registrado_por, fecha) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(cobro.id)
        .bind(documento_id)
        .bind(cobro.monto)
        .bind(cobro.metodo_pago)
        .bind(&cobro.referencia)
        .bind(&cobro.banco_origen)
        .bind(&cobro.cuenta_destino)
        .bind(&cobro.notas)
        .bind(registrado_por)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Full payment releases the empleados' consumed credit, once
        let mut restaurado = documento.credito_restaurado;
        if estado == EstadoDocumento::Pagado && !restaurado {
            let por_empleado: Vec<(i64, f64)> = sqlx::query_as(
                "SELECT empleado_id, COALESCE(SUM(monto), 0.0) FROM consumo \
                 WHERE documento_cxc_id = ? AND reversado = 0 GROUP BY empleado_id",
            )
            .bind(documento_id)
            .fetch_all(&mut *tx)
            .await?;
            for (empleado_id, monto) in por_empleado {
                empleado::restaurar_credito(&mut *tx, empleado_id, monto).await?;
            }
            restaurado = true;
        }

        sqlx::query(
            "UPDATE documento_cxc SET monto_pagado = ?, monto_pendiente = ?, estado = ?, credito_restaurado = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(pagado)
        .bind(pendiente)
        .bind(estado)
        .bind(restaurado)
        .bind(now)
        .bind(documento_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        documento.monto_pagado = pagado;
        documento.monto_pendiente = pendiente;
        documento.estado = estado;
        documento.credito_restaurado = restaurado;
        documento.updated_at = now;

        tracing::info!(
            numero = %documento.numero,
            monto = cobro.monto,
            estado = documento.estado.label(),
            "cobro applied"
        );
        if documento.estado == EstadoDocumento::Pagado {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
        }
        Ok((documento, cobro))
    }

    /// Apply a pago to a CxP documento
    pub async fn aplicar_pago(
        &self,
        documento_id: i64,
        data: PagoCreate,
        registrado_por: i64,
    ) -> AppResult<(DocumentoCxp, Pago)> {
        validate_monto(data.monto)?;

        let lock = self.doc_lock(documento_id);
        let guard = lock.lock().await;

        let mut documento = documento_cxp::find_by_id(&self.pool, documento_id)
            .await?
            .ok_or_else(|| {
                AppError::business_rule(
                    ErrorCode::DocumentoNotFound,
                    format!("Documento CxP {documento_id} not found"),
                )
            })?;
        if let Err(err) = estado_guard(documento.estado) {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
            return Err(err);
        }
        check_pendiente(data.monto, documento.monto_pendiente)?;

        let now = shared::util::now_millis();
        let pago = Pago {
            id: shared::util::snowflake_id(),
            documento_id,
            monto: money::round2_f64(data.monto),
            metodo_pago: data.metodo_pago,
            referencia: data.referencia,
            banco_origen: data.banco_origen,
            cuenta_destino: data.cuenta_destino,
            notas: data.notas,
            registrado_por,
            fecha: now,
        };
        let (pagado, pendiente, estado) =
            recompute(documento.monto_pagado, pago.monto, documento.monto_total);

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO pago (id, documento_id, monto, metodo_pago, referencia, banco_origen, cuenta_destino, notas, registrado_por, fecha) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pago.id)
        .bind(documento_id)
        .bind(pago.monto)
        .bind(pago.metodo_pago)
        .bind(&pago.referencia)
        .bind(&pago.banco_origen)
        .bind(&pago.cuenta_destino)
        .bind(&pago.notas)
        .bind(registrado_por)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE documento_cxp SET monto_pagado = ?, monto_pendiente = ?, estado = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(pagado)
        .bind(pendiente)
        .bind(estado)
        .bind(now)
        .bind(documento_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        documento.monto_pagado = pagado;
        documento.monto_pendiente = pendiente;
        documento.estado = estado;
        documento.updated_at = now;

        tracing::info!(
            numero = %documento.numero,
            monto = pago.monto,
            estado = documento.estado.label(),
            "pago applied"
        );
        if documento.estado == EstadoDocumento::Pagado {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
        }
        Ok((documento, pago))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use crate::db::repository;
    use crate::utils::time;
    use shared::error::ErrorCode;
    use shared::models::{CobroCreate, EstadoDocumento, MetodoPago};

    fn cobro(monto: f64) -> CobroCreate {
        CobroCreate {
            monto,
            metodo_pago: MetodoPago::Transferencia,
            referencia: None,
            banco_origen: None,
            cuenta_destino: None,
            notas: None,
        }
    }

    async fn consolidated_cxc(
        svc: &crate::billing::BillingService,
        fx: &testutil::Fixture,
        montos: &[f64],
    ) -> i64 {
        for &monto in montos {
            testutil::consumo(svc.pool(), fx, monto).await;
        }
        let hoy = time::today(svc.timezone());
        svc.consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_overpayment_rejected_and_state_unchanged() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let doc_id = consolidated_cxc(&svc, &fx, &[1000.0]).await;

        let err = svc
            .aplicar_cobro(doc_id, cobro(1200.0), testutil::USUARIO_TEST)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PagoExcedeSaldoPendiente);

        let doc = repository::documento_cxc::find_by_id(svc.pool(), doc_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.estado, EstadoDocumento::Pendiente);
        assert_eq!(doc.monto_pendiente, 1000.0);
        assert!(repository::documento_cxc::find_cobros(svc.pool(), doc_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_estado_progression_and_terminal_rejection() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let doc_id = consolidated_cxc(&svc, &fx, &[1000.0]).await;

        let (doc, _) = svc
            .aplicar_cobro(doc_id, cobro(400.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert_eq!(doc.estado, EstadoDocumento::Parcial);
        assert_eq!(doc.monto_pendiente, 600.0);

        let (doc, _) = svc
            .aplicar_cobro(doc_id, cobro(600.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert_eq!(doc.estado, EstadoDocumento::Pagado);
        assert_eq!(doc.monto_pendiente, 0.0);

        let err = svc
            .aplicar_cobro(doc_id, cobro(1.0), testutil::USUARIO_TEST)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentoAlreadyPagado);
    }

    #[tokio::test]
    async fn test_non_positive_monto_rejected() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let doc_id = consolidated_cxc(&svc, &fx, &[100.0]).await;

        for monto in [0.0, -5.0] {
            let err = svc
                .aplicar_cobro(doc_id, cobro(monto), testutil::USUARIO_TEST)
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::PagoMontoInvalido);
        }
    }

    async fn saldo(pool: &sqlx::SqlitePool, empleado_id: i64) -> f64 {
        repository::empleado::find_by_id(pool, empleado_id)
            .await
            .unwrap()
            .unwrap()
            .saldo_disponible
    }

    #[tokio::test]
    async fn test_credit_restored_exactly_once_on_full_payment() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let doc_id = consolidated_cxc(&svc, &fx, &[1000.0]).await;

        assert_eq!(saldo(svc.pool(), fx.empleado_id).await, 4000.0);

        // Partial payment does not restore
        svc.aplicar_cobro(doc_id, cobro(400.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert_eq!(saldo(svc.pool(), fx.empleado_id).await, 4000.0);

        // Full payment restores the consumed amount
        let (doc, _) = svc
            .aplicar_cobro(doc_id, cobro(600.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert!(doc.credito_restaurado);
        assert_eq!(saldo(svc.pool(), fx.empleado_id).await, 5000.0);
    }

    #[tokio::test]
    async fn test_doc_lock_entry_evicted_once_terminal() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let doc_id = consolidated_cxc(&svc, &fx, &[500.0]).await;

        svc.aplicar_cobro(doc_id, cobro(100.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert!(svc.doc_locks.contains_key(&doc_id));

        svc.aplicar_cobro(doc_id, cobro(400.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert!(!svc.doc_locks.contains_key(&doc_id));

        // A rejected attempt on the paid documento leaves no entry behind
        svc.aplicar_cobro(doc_id, cobro(1.0), testutil::USUARIO_TEST)
            .await
            .unwrap_err();
        assert!(!svc.doc_locks.contains_key(&doc_id));
    }

    #[tokio::test]
    async fn test_pago_cxp_full_cycle() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 1000.0).await;
        let hoy = time::today(svc.timezone());
        let doc = svc.consolidar_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();
        assert_eq!(doc.monto_pendiente, 920.0);

        let (doc, _) = svc
            .aplicar_pago(doc.id, cobro(920.0), testutil::USUARIO_TEST)
            .await
            .unwrap();
        assert_eq!(doc.estado, EstadoDocumento::Pagado);
        assert_eq!(doc.monto_pendiente, 0.0);
    }
}
