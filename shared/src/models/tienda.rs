//! Tienda Model (merchant store)

use serde::{Deserialize, Serialize};

/// Tienda entity: a physical store of one proveedor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tienda {
    pub id: i64,
    pub proveedor_id: i64,
    pub nombre: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create tienda payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiendaCreate {
    pub nombre: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
}

/// Update tienda payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiendaUpdate {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub is_active: Option<bool>,
}
