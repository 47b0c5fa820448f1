//! Aging classification
//!
//! Derived at read time from `fecha_vencimiento`, never stored. Only
//! documentos still accepting payments (Pendiente, Parcial) appear in the
//! report; terminal ones carry no receivable risk.

use shared::error::{AppError, AppResult};
use shared::models::{AntiguedadBucket, AntiguedadReporte, RangoAntiguedad};

use super::{money, BillingService};
use crate::db::repository::{documento_cxc, documento_cxp};
use crate::utils::time;

const RANGOS: [RangoAntiguedad; 5] = [
    RangoAntiguedad::Vigente,
    RangoAntiguedad::Dias1a30,
    RangoAntiguedad::Dias31a60,
    RangoAntiguedad::Dias61a90,
    RangoAntiguedad::Mas90,
];

impl BillingService {
    /// Days overdue and aging bucket for a due date
    pub fn clasificar(&self, fecha_vencimiento: i64) -> (i64, RangoAntiguedad) {
        let dias = time::dias_vencido(fecha_vencimiento, self.timezone);
        (dias, RangoAntiguedad::from_dias_vencido(dias))
    }

    /// Aging report over the open documentos of one family ("cxc" or "cxp").
    /// CxP documentos carry no due date; they age from their emission date.
    pub async fn reporte_antiguedad(&self, tipo: &str) -> AppResult<AntiguedadReporte> {
        let vencimientos: Vec<(i64, f64)> = match tipo {
            "cxc" => documento_cxc::find_abiertos(&self.pool)
                .await?
                .into_iter()
                .map(|d| (d.fecha_vencimiento, d.monto_pendiente))
                .collect(),
            "cxp" => documento_cxp::find_abiertos(&self.pool)
                .await?
                .into_iter()
                .map(|d| (d.fecha_emision, d.monto_pendiente))
                .collect(),
            other => {
                return Err(AppError::validation(format!(
                    "tipo must be 'cxc' or 'cxp', got '{other}'"
                )))
            }
        };

        let mut cantidades = [0i64; RANGOS.len()];
        let mut montos = [rust_decimal::Decimal::ZERO; RANGOS.len()];
        for (vencimiento, pendiente) in &vencimientos {
            let (_, rango) = self.clasificar(*vencimiento);
            let idx = RANGOS.iter().position(|r| *r == rango).unwrap_or(0);
            cantidades[idx] += 1;
            montos[idx] += money::dec(*pendiente);
        }

        let buckets: Vec<AntiguedadBucket> = RANGOS
            .iter()
            .enumerate()
            .map(|(idx, rango)| AntiguedadBucket {
                rango: *rango,
                cantidad_documentos: cantidades[idx],
                monto_pendiente: money::to_f64(money::round2(montos[idx])),
            })
            .collect();

        Ok(AntiguedadReporte {
            tipo: tipo.to_string(),
            total_documentos: vencimientos.len() as i64,
            total_pendiente: money::sum2(vencimientos.iter().map(|(_, p)| *p)),
            buckets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use crate::utils::time;
    use shared::models::RangoAntiguedad;

    const DAY: i64 = 24 * 3600 * 1000;

    async fn doc_with_vencimiento(
        svc: &crate::billing::BillingService,
        fx: &testutil::Fixture,
        monto: f64,
        vencimiento: i64,
    ) {
        testutil::consumo(svc.pool(), fx, monto).await;
        let hoy = time::today(svc.timezone());
        let doc = svc
            .consolidar_cxc(fx.empresa_id, hoy, hoy, None)
            .await
            .unwrap();
        sqlx::query("UPDATE documento_cxc SET fecha_vencimiento = ? WHERE id = ?")
            .bind(vencimiento)
            .bind(doc.id)
            .execute(svc.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_aging_bucket_boundaries() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        let now = shared::util::now_millis();

        doc_with_vencimiento(&svc, &fx, 100.0, now + DAY).await; // Vigente
        doc_with_vencimiento(&svc, &fx, 200.0, now - 30 * DAY).await; // 1-30
        doc_with_vencimiento(&svc, &fx, 300.0, now - 31 * DAY).await; // 31-60

        let reporte = svc.reporte_antiguedad("cxc").await.unwrap();
        assert_eq!(reporte.total_documentos, 3);
        assert_eq!(reporte.total_pendiente, 600.0);
        assert_eq!(reporte.buckets.len(), 5);

        let bucket = |rango: RangoAntiguedad| {
            reporte
                .buckets
                .iter()
                .find(|b| b.rango == rango)
                .unwrap()
                .clone()
        };
        assert_eq!(bucket(RangoAntiguedad::Vigente).monto_pendiente, 100.0);
        assert_eq!(bucket(RangoAntiguedad::Dias1a30).monto_pendiente, 200.0);
        assert_eq!(bucket(RangoAntiguedad::Dias31a60).monto_pendiente, 300.0);
        assert_eq!(bucket(RangoAntiguedad::Dias61a90).cantidad_documentos, 0);
        assert_eq!(bucket(RangoAntiguedad::Mas90).cantidad_documentos, 0);
    }

    #[tokio::test]
    async fn test_aging_rejects_unknown_tipo() {
        let svc = testutil::service().await;
        assert!(svc.reporte_antiguedad("cxz").await.is_err());
    }
}
