//! Consumo Model (credit-based purchase event)

use serde::{Deserialize, Serialize};

/// Consumo entity: a single purchase by an empleado at a caja.
///
/// Immutable once created except for the reversal flag and the documento
/// attachment ids set by billing consolidation. A reversed consumo is
/// excluded from balances and billing eligibility but retained for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Consumo {
    pub id: i64,
    pub empleado_id: i64,
    /// Denormalized from empleado at registration time; CxC eligibility
    /// scans filter on it directly
    pub empresa_id: i64,
    pub proveedor_id: i64,
    pub tienda_id: i64,
    pub caja_id: i64,
    pub monto: f64,
    pub concepto: Option<String>,
    pub referencia: Option<String>,
    /// Registering back-office user
    pub registrado_por: i64,
    /// Event time, Unix millis
    pub fecha: i64,
    #[serde(default)]
    pub reversado: bool,
    pub reversado_utc: Option<i64>,
    /// CxC documento this consumo was billed on (null until consolidated)
    pub documento_cxc_id: Option<i64>,
    /// CxP documento this consumo was settled on (null until consolidated)
    pub documento_cxp_id: Option<i64>,
    pub created_at: i64,
}

/// Create consumo payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumoCreate {
    pub empleado_id: i64,
    pub caja_id: i64,
    pub monto: f64,
    pub concepto: Option<String>,
    pub referencia: Option<String>,
}

/// Consumo listing row with joined display names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ConsumoDetalle {
    pub id: i64,
    pub empleado_id: i64,
    pub empleado_nombre: String,
    pub empresa_id: i64,
    pub empresa_nombre: String,
    pub proveedor_id: i64,
    pub proveedor_nombre: String,
    pub tienda_nombre: String,
    pub caja_nombre: String,
    pub monto: f64,
    pub concepto: Option<String>,
    pub referencia: Option<String>,
    pub fecha: i64,
    pub reversado: bool,
    pub reversado_utc: Option<i64>,
}
