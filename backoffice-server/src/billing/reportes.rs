//! Report aggregates: dashboard KPIs and the period consumption summary

use chrono::{Datelike, NaiveDate};
use shared::error::AppResult;
use shared::models::{DashboardResumen, ResumenConsumos};
use sqlx::{QueryBuilder, Sqlite};

use super::{money, BillingService};
use crate::utils::time;

/// Visibility scope for the role-aware dashboard. The handler derives it
/// from the authenticated usuario; out-of-scope KPIs are zeroed, keeping one
/// response shape for every rol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardScope {
    Global,
    Empresa(i64),
    Caja(i64),
    Empleado(i64),
}

/// (total, reversados, monto activo, monto reversado)
type ConsumoAgg = (i64, i64, f64, f64);

fn consumo_agg_query(desde_ms: i64, hasta_ms: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT COUNT(*), \
         COUNT(CASE WHEN reversado = 1 THEN 1 END), \
         COALESCE(SUM(CASE WHEN reversado = 0 THEN monto END), 0.0), \
         COALESCE(SUM(CASE WHEN reversado = 1 THEN monto END), 0.0) \
         FROM consumo WHERE fecha >= ",
    );
    qb.push_bind(desde_ms).push(" AND fecha < ").push_bind(hasta_ms);
    qb
}

impl BillingService {
    /// Period consumption summary, optionally scoped to one empresa and/or
    /// proveedor
    pub async fn resumen_consumos(
        &self,
        desde: NaiveDate,
        hasta: NaiveDate,
        empresa_id: Option<i64>,
        proveedor_id: Option<i64>,
    ) -> AppResult<ResumenConsumos> {
        time::validate_range(desde, hasta)?;
        let mut qb = consumo_agg_query(
            time::day_start_millis(desde, self.timezone),
            time::day_end_millis(hasta, self.timezone),
        );
        if let Some(id) = empresa_id {
            qb.push(" AND empresa_id = ").push_bind(id);
        }
        if let Some(id) = proveedor_id {
            qb.push(" AND proveedor_id = ").push_bind(id);
        }
        let (cantidad, reversados, monto, monto_reversado): ConsumoAgg =
            qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(ResumenConsumos {
            desde: desde.to_string(),
            hasta: hasta.to_string(),
            cantidad_consumos: cantidad,
            cantidad_reversados: reversados,
            monto_total: money::round2_f64(monto),
            monto_reversado: money::round2_f64(monto_reversado),
        })
    }

    /// Role-aware dashboard KPIs
    pub async fn dashboard_resumen(&self, scope: DashboardScope) -> AppResult<DashboardResumen> {
        let hoy = time::today(self.timezone);
        let inicio_mes = hoy.with_day(1).unwrap_or(hoy);
        let desde_ms = time::day_start_millis(inicio_mes, self.timezone);
        let hasta_ms = time::day_end_millis(hoy, self.timezone);

        let mut qb = consumo_agg_query(desde_ms, hasta_ms);
        match scope {
            DashboardScope::Global => {}
            DashboardScope::Empresa(id) => {
                qb.push(" AND empresa_id = ").push_bind(id);
            }
            DashboardScope::Caja(id) => {
                qb.push(" AND caja_id = ").push_bind(id);
            }
            DashboardScope::Empleado(id) => {
                qb.push(" AND empleado_id = ").push_bind(id);
            }
        }
        let (consumos_mes, _, monto_mes, _): ConsumoAgg =
            qb.build_query_as().fetch_one(&self.pool).await?;

        let mut resumen = DashboardResumen {
            consumos_mes,
            monto_consumos_mes: money::round2_f64(monto_mes),
            ..Default::default()
        };

        match scope {
            DashboardScope::Global => {
                resumen.total_empresas =
                    sqlx::query_scalar("SELECT COUNT(*) FROM empresa WHERE is_active = 1")
                        .fetch_one(&self.pool)
                        .await?;
                resumen.total_proveedores =
                    sqlx::query_scalar("SELECT COUNT(*) FROM proveedor WHERE is_active = 1")
                        .fetch_one(&self.pool)
                        .await?;
                resumen.total_empleados =
                    sqlx::query_scalar("SELECT COUNT(*) FROM empleado WHERE is_active = 1")
                        .fetch_one(&self.pool)
                        .await?;

                let (abiertos, pendiente): (i64, f64) = sqlx::query_as(
                    "SELECT COUNT(*), COALESCE(SUM(monto_pendiente), 0.0) \
                     FROM documento_cxc WHERE estado IN (0, 1)",
                )
                .fetch_one(&self.pool)
                .await?;
                resumen.documentos_cxc_abiertos = abiertos;
                resumen.cxc_pendiente = money::round2_f64(pendiente);

                let (abiertos, pendiente): (i64, f64) = sqlx::query_as(
                    "SELECT COUNT(*), COALESCE(SUM(monto_pendiente), 0.0) \
                     FROM documento_cxp WHERE estado IN (0, 1)",
                )
                .fetch_one(&self.pool)
                .await?;
                resumen.documentos_cxp_abiertos = abiertos;
                resumen.cxp_pendiente = money::round2_f64(pendiente);
            }
            DashboardScope::Empresa(id) => {
                resumen.total_empleados = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM empleado WHERE empresa_id = ? AND is_active = 1",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

                let (abiertos, pendiente): (i64, f64) = sqlx::query_as(
                    "SELECT COUNT(*), COALESCE(SUM(monto_pendiente), 0.0) \
                     FROM documento_cxc WHERE empresa_id = ? AND estado IN (0, 1)",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
                resumen.documentos_cxc_abiertos = abiertos;
                resumen.cxc_pendiente = money::round2_f64(pendiente);
            }
            // Caja and Empleado scopes only see their own consumption KPIs
            DashboardScope::Caja(_) | DashboardScope::Empleado(_) => {}
        }

        Ok(resumen)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil;
    use super::DashboardScope;
    use crate::utils::time;

    #[tokio::test]
    async fn test_resumen_consumos_splits_reversados() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 600.0).await;
        let reversado = testutil::consumo(svc.pool(), &fx, 400.0).await;
        svc.reversar_consumo(reversado).await.unwrap();

        let hoy = time::today(svc.timezone());
        let resumen = svc
            .resumen_consumos(hoy, hoy, Some(fx.empresa_id), None)
            .await
            .unwrap();
        assert_eq!(resumen.cantidad_consumos, 2);
        assert_eq!(resumen.cantidad_reversados, 1);
        assert_eq!(resumen.monto_total, 600.0);
        assert_eq!(resumen.monto_reversado, 400.0);
    }

    #[tokio::test]
    async fn test_dashboard_global_counts() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 250.0).await;

        let resumen = svc.dashboard_resumen(DashboardScope::Global).await.unwrap();
        assert_eq!(resumen.total_empresas, 1);
        assert_eq!(resumen.total_proveedores, 1);
        assert_eq!(resumen.total_empleados, 1);
        assert_eq!(resumen.consumos_mes, 1);
        assert_eq!(resumen.monto_consumos_mes, 250.0);
        assert_eq!(resumen.documentos_cxc_abiertos, 0);
    }

    #[tokio::test]
    async fn test_dashboard_empresa_scope_zeroes_foreign_kpis() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        testutil::consumo(svc.pool(), &fx, 250.0).await;

        let hoy = time::today(svc.timezone());
        svc.consolidar_cxp(fx.proveedor_id, hoy, hoy).await.unwrap();

        let resumen = svc
            .dashboard_resumen(DashboardScope::Empresa(fx.empresa_id))
            .await
            .unwrap();
        assert_eq!(resumen.total_empresas, 0);
        assert_eq!(resumen.total_empleados, 1);
        assert_eq!(resumen.consumos_mes, 1);
        // CxP is outside an empleador's scope
        assert_eq!(resumen.documentos_cxp_abiertos, 0);
        assert_eq!(resumen.cxp_pendiente, 0.0);
    }
}
