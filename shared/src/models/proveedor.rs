//! Proveedor Model (affiliated merchant)

use serde::{Deserialize, Serialize};

/// Proveedor entity: a merchant paid out net of commission (CxP side)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Proveedor {
    pub id: i64,
    pub nombre: String,
    /// Tax registration number (RNC)
    pub rnc: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    /// Platform margin withheld from payables (0-100)
    pub porcentaje_comision: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create proveedor payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveedorCreate {
    pub nombre: String,
    pub rnc: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub porcentaje_comision: f64,
}

/// Update proveedor payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveedorUpdate {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub porcentaje_comision: Option<f64>,
    pub is_active: Option<bool>,
}
