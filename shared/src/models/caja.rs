//! Caja Model (store register)

use serde::{Deserialize, Serialize};

/// Caja entity: a register inside one tienda where consumos are captured
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Caja {
    pub id: i64,
    pub tienda_id: i64,
    pub nombre: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create caja payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CajaCreate {
    pub nombre: String,
}

/// Update caja payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CajaUpdate {
    pub nombre: Option<String>,
    pub is_active: Option<bool>,
}
