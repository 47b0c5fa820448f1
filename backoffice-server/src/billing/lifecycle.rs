//! Documento lifecycle: anulación and refinanciamiento
//!
//! Anulación voids a documento that has no applied payments and detaches its
//! consumos, releasing them for a later consolidation. Refinanciamiento
//! (CxC only) closes the documento terminally while keeping its consumos
//! attached, so they are never billed twice.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DocumentoCxc, DocumentoCxp, EstadoDocumento};

use super::BillingService;
use crate::db::repository::{documento_cxc, documento_cxp};

fn terminal_error(estado: EstadoDocumento) -> AppError {
    match estado {
        EstadoDocumento::Pagado => AppError::business_rule(
            ErrorCode::DocumentoAlreadyPagado,
            "Documento is already fully paid",
        ),
        EstadoDocumento::Refinanciado => AppError::business_rule(
            ErrorCode::DocumentoAlreadyRefinanciado,
            "Documento was already refinanced",
        ),
        _ => AppError::business_rule(
            ErrorCode::DocumentoAlreadyAnulado,
            "Documento was already voided",
        ),
    }
}

impl BillingService {
    /// Void a CxC documento and release its consumos for re-billing
    pub async fn anular_documento_cxc(&self, documento_id: i64) -> AppResult<DocumentoCxc> {
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
        if documento.estado.es_terminal() {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
            return Err(terminal_error(documento.estado));
        }

        let cobros: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cobro WHERE documento_id = ?")
            .bind(documento_id)
            .fetch_one(&self.pool)
            .await?;
        if cobros > 0 {
            return Err(AppError::business_rule(
                ErrorCode::DocumentoHasPayments,
                format!("Documento {} has {cobros} applied cobros", documento.numero),
            ));
        }

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE documento_cxc SET estado = ?, updated_at = ? WHERE id = ?")
            .bind(EstadoDocumento::Anulado)
            .bind(now)
            .bind(documento_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE consumo SET documento_cxc_id = NULL WHERE documento_cxc_id = ?")
            .bind(documento_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        documento.estado = EstadoDocumento::Anulado;
        documento.updated_at = now;
        tracing::info!(numero = %documento.numero, "CxC documento voided, consumos released");
        drop(guard);
        drop(lock);
        self.release_doc_lock(documento_id);
        Ok(documento)
    }

    /// Void a CxP documento and release its consumos
    pub async fn anular_documento_cxp(&self, documento_id: i64) -> AppResult<DocumentoCxp> {
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
        if documento.estado.es_terminal() {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
            return Err(terminal_error(documento.estado));
        }

        let pagos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pago WHERE documento_id = ?")
            .bind(documento_id)
            .fetch_one(&self.pool)
            .await?;
        if pagos > 0 {
            return Err(AppError::business_rule(
                ErrorCode::DocumentoHasPayments,
                format!("Documento {} has {pagos} applied pagos", documento.numero),
            ));
        }

        let now = shared::util::now_millis();
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE documento_cxp SET estado = ?, updated_at = ? WHERE id = ?")
            .bind(EstadoDocumento::Anulado)
            .bind(now)
            .bind(documento_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE consumo SET documento_cxp_id = NULL WHERE documento_cxp_id = ?")
            .bind(documento_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        documento.estado = EstadoDocumento::Anulado;
        documento.updated_at = now;
        tracing::info!(numero = %documento.numero, "CxP documento voided, consumos released");
        drop(guard);
        drop(lock);
        self.release_doc_lock(documento_id);
        Ok(documento)
    }

    /// Refinance a CxC documento: terminal close, consumos stay attached
    pub async fn refinanciar_documento_cxc(&self, documento_id: i64) -> AppResult<DocumentoCxc> {
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
        if documento.estado.es_terminal() {
            drop(guard);
            drop(lock);
            self.release_doc_lock(documento_id);
            return Err(terminal_error(documento.estado));
        }

        let now = shared::util::now_millis();
        sqlx::query("UPDATE documento_cxc SET estado = ?, updated_at = ? WHERE id = ?")
            .bind(EstadoDocumento::Refinanciado)
            .bind(now)
            .bind(documento_id)
            .execute(&self.pool)
            .await?;

        documento.estado = EstadoDocumento::Refinanciado;
        documento.updated_at = now;
        tracing::info!(numero = %documento.numero, "CxC documento refinanced");
        drop(guard);
        drop(lock);
        self.release_doc_lock(documento_id);
        Ok(documento)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use crate::utils::time;
    use shared::error::ErrorCode;
    use shared::models::{CobroCreate, EstadoDocumento, MetodoPago};

    fn cobro(monto: f64) -> CobroCreate {
        CobroCreate {
            monto,
            metodo_pago: MetodoPago::Cheque,
            referencia: None,
            banco_origen: None,
            cuenta_destino: None,
            notas: None,
        }
    }

    #[tokio::test]
    async fn test_anular_releases_consumos_for_rebilling() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 500.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();

        let anulado = svc.anular_documento_cxc(doc.id).await.unwrap();
        assert_eq!(anulado.estado, EstadoDocumento::Anulado);
        assert!(!svc.doc_locks.contains_key(&doc.id));

        // Released consumos are eligible again
        let preview = svc.preview_cxc(fx.empresa_id, hoy, hoy).await.unwrap();
        assert_eq!(preview.cantidad_consumos, 1);
        assert_eq!(preview.monto_total, 500.0);

        let rebilled = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        assert_eq!(rebilled.monto_total, 500.0);
    }

    #[tokio::test]
    async fn test_anular_with_payments_rejected() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 500.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        svc.aplicar_cobro(doc.id, cobro(100.0), testutil::USUARIO_TEST)
            .await
            .unwrap();

        let err = svc.anular_documento_cxc(doc.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentoHasPayments);
    }

    #[tokio::test]
    async fn test_refinanciar_is_terminal_and_keeps_consumos_attached() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 500.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        let refinanciado = svc.refinanciar_documento_cxc(doc.id).await.unwrap();
        assert_eq!(refinanciado.estado, EstadoDocumento::Refinanciado);

        // No further payments, no double billing
        let err = svc
            .aplicar_cobro(doc.id, cobro(100.0), testutil::USUARIO_TEST)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentoAlreadyRefinanciado);
        let preview = svc.preview_cxc(fx.empresa_id, hoy, hoy).await.unwrap();
        assert_eq!(preview.cantidad_consumos, 0);

        let err = svc.refinanciar_documento_cxc(doc.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentoAlreadyRefinanciado);
    }

    #[tokio::test]
    async fn test_anular_cxp() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 500.0).await;

        let hoy = time::today(svc.timezone());
        let doc = svc.consolidar_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();
        let anulado = svc.anular_documento_cxp(doc.id).await.unwrap();
        assert_eq!(anulado.estado, EstadoDocumento::Anulado);

        let preview = svc.preview_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();
        assert_eq!(preview.cantidad_consumos, 1);
    }
}
