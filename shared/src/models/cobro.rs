//! Cobro / Pago Models (payment application records)

use serde::{Deserialize, Serialize};

/// Payment method accepted for cobros and pagos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MetodoPago {
    #[serde(rename = "EFECTIVO")]
    Efectivo,
    #[serde(rename = "TRANSFERENCIA")]
    Transferencia,
    #[serde(rename = "CHEQUE")]
    Cheque,
    #[serde(rename = "TARJETA_CREDITO")]
    TarjetaCredito,
    #[serde(rename = "TARJETA_DEBITO")]
    TarjetaDebito,
    #[serde(rename = "OTRO")]
    Otro,
}

impl MetodoPago {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Efectivo => "Efectivo",
            Self::Transferencia => "Transferencia",
            Self::Cheque => "Cheque",
            Self::TarjetaCredito => "Tarjeta Crédito",
            Self::TarjetaDebito => "Tarjeta Débito",
            Self::Otro => "Otro",
        }
    }
}

/// Cobro: an immutable payment applied to one CxC documento
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Cobro {
    pub id: i64,
    pub documento_id: i64,
    pub monto: f64,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
    pub banco_origen: Option<String>,
    pub cuenta_destino: Option<String>,
    pub notas: Option<String>,
    /// Registering back-office user
    pub registrado_por: i64,
    pub fecha: i64,
}

/// Apply-cobro payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CobroCreate {
    pub monto: f64,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
    pub banco_origen: Option<String>,
    pub cuenta_destino: Option<String>,
    pub notas: Option<String>,
}

/// Pago: an immutable payment applied to one CxP documento. Same shape as
/// [`Cobro`]; kept as its own type because the two live in different tables
/// and wire families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Pago {
    pub id: i64,
    pub documento_id: i64,
    pub monto: f64,
    pub metodo_pago: MetodoPago,
    pub referencia: Option<String>,
    pub banco_origen: Option<String>,
    pub cuenta_destino: Option<String>,
    pub notas: Option<String>,
    pub registrado_por: i64,
    pub fecha: i64,
}

/// Apply-pago payload
pub type PagoCreate = CobroCreate;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metodo_pago_wire_names() {
        let json = serde_json::to_string(&MetodoPago::TarjetaCredito).unwrap();
        assert_eq!(json, "\"TARJETA_CREDITO\"");
        let metodo: MetodoPago = serde_json::from_str("\"EFECTIVO\"").unwrap();
        assert_eq!(metodo, MetodoPago::Efectivo);
    }
}
