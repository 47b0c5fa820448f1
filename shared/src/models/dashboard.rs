//! Dashboard and report DTOs

use super::documento::RangoAntiguedad;
use serde::{Deserialize, Serialize};

/// Role-aware landing KPIs. Fields outside the caller's scope are zeroed by
/// the handler, not omitted, so the shape is stable across roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResumen {
    pub total_empresas: i64,
    pub total_proveedores: i64,
    pub total_empleados: i64,
    /// Consumos registered in the current calendar month (business timezone)
    pub consumos_mes: i64,
    pub monto_consumos_mes: f64,
    /// Outstanding receivables across non-terminal CxC documentos
    pub cxc_pendiente: f64,
    /// Outstanding payables across non-terminal CxP documentos
    pub cxp_pendiente: f64,
    pub documentos_cxc_abiertos: i64,
    pub documentos_cxp_abiertos: i64,
}

/// Per-empresa receivables aggregate for the CxC landing list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ResumenCxcEmpresa {
    pub empresa_id: i64,
    pub empresa_nombre: String,
    pub documentos_abiertos: i64,
    pub monto_pendiente: f64,
    /// Consumos not yet attached to any documento
    pub consumos_sin_facturar: i64,
    pub monto_sin_facturar: f64,
}

/// Per-proveedor payables aggregate for the CxP landing list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ResumenCxpProveedor {
    pub proveedor_id: i64,
    pub proveedor_nombre: String,
    pub porcentaje_comision: f64,
    pub documentos_abiertos: i64,
    pub monto_pendiente: f64,
    pub consumos_sin_facturar: i64,
    pub monto_sin_facturar: f64,
}

/// One aging bucket row in the antiquity report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiguedadBucket {
    pub rango: RangoAntiguedad,
    pub cantidad_documentos: i64,
    pub monto_pendiente: f64,
}

/// Aging report: outstanding documents bucketed by overdue severity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntiguedadReporte {
    /// "cxc" or "cxp"
    pub tipo: String,
    pub buckets: Vec<AntiguedadBucket>,
    pub total_documentos: i64,
    pub total_pendiente: f64,
}

/// Period consumption summary for the reports page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenConsumos {
    pub desde: String,
    pub hasta: String,
    pub cantidad_consumos: i64,
    pub cantidad_reversados: i64,
    pub monto_total: f64,
    pub monto_reversado: f64,
}
