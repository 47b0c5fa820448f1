//! Empresa Model (employer company)

use serde::{Deserialize, Serialize};

/// Empresa entity: an employer billed periodically for its employees'
/// consumption (CxC side)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Empresa {
    pub id: i64,
    pub nombre: String,
    /// Tax registration number (RNC)
    pub rnc: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    /// Cut-off day of month (1-28) for billing consolidation
    pub dia_corte: i32,
    /// Grace days after fecha_vencimiento before a document counts as overdue
    pub dias_gracia: i32,
    /// Default days-to-pay used when a consolidation request omits it
    pub dias_para_pagar: i32,
    /// Whether the scheduler auto-generates consolidations on dia_corte
    pub corte_automatico: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create empresa payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaCreate {
    pub nombre: String,
    pub rnc: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    #[serde(default = "default_dia_corte")]
    pub dia_corte: i32,
    #[serde(default)]
    pub dias_gracia: i32,
    #[serde(default = "default_dias_para_pagar")]
    pub dias_para_pagar: i32,
    #[serde(default)]
    pub corte_automatico: bool,
}

fn default_dia_corte() -> i32 {
    28
}

fn default_dias_para_pagar() -> i32 {
    30
}

/// Update empresa payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpresaUpdate {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub dia_corte: Option<i32>,
    pub dias_gracia: Option<i32>,
    pub dias_para_pagar: Option<i32>,
    pub corte_automatico: Option<bool>,
    pub is_active: Option<bool>,
}
