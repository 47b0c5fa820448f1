//! Documento Models (CxC receivables / CxP payables)

use serde::{Deserialize, Serialize};

/// Billing document state.
///
/// Integer-coded on the wire. Transitions are monotonic:
/// Pendiente → Parcial → Pagado, with Refinanciado (CxC only) and Anulado as
/// terminal alternatives. Nothing regresses once Pagado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(into = "u8", try_from = "u8")]
#[repr(i32)]
pub enum EstadoDocumento {
    Pendiente = 0,
    Parcial = 1,
    Pagado = 2,
    Refinanciado = 3,
    Anulado = 4,
}

impl EstadoDocumento {
    /// Terminal states accept no further mutations
    pub fn es_terminal(&self) -> bool {
        matches!(self, Self::Pagado | Self::Refinanciado | Self::Anulado)
    }

    /// Whether payment applications are still accepted
    pub fn acepta_pagos(&self) -> bool {
        matches!(self, Self::Pendiente | Self::Parcial)
    }

    /// Spanish display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendiente => "Pendiente",
            Self::Parcial => "Parcial",
            Self::Pagado => "Pagado",
            Self::Refinanciado => "Refinanciado",
            Self::Anulado => "Anulado",
        }
    }
}

impl From<EstadoDocumento> for u8 {
    fn from(estado: EstadoDocumento) -> Self {
        estado as u8
    }
}

impl TryFrom<u8> for EstadoDocumento {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pendiente),
            1 => Ok(Self::Parcial),
            2 => Ok(Self::Pagado),
            3 => Ok(Self::Refinanciado),
            4 => Ok(Self::Anulado),
            other => Err(format!("invalid estado: {other}")),
        }
    }
}

/// Aging bucket for outstanding documents. Derived from fecha_vencimiento,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangoAntiguedad {
    #[serde(rename = "Vigente")]
    Vigente,
    #[serde(rename = "1-30 dias")]
    Dias1a30,
    #[serde(rename = "31-60 dias")]
    Dias31a60,
    #[serde(rename = "61-90 dias")]
    Dias61a90,
    #[serde(rename = "90+ dias")]
    Mas90,
}

impl RangoAntiguedad {
    /// Classify by days overdue
    pub fn from_dias_vencido(dias: i64) -> Self {
        match dias {
            ..=0 => Self::Vigente,
            1..=30 => Self::Dias1a30,
            31..=60 => Self::Dias31a60,
            61..=90 => Self::Dias61a90,
            _ => Self::Mas90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Vigente => "Vigente",
            Self::Dias1a30 => "1-30 dias",
            Self::Dias31a60 => "31-60 dias",
            Self::Dias61a90 => "61-90 dias",
            Self::Mas90 => "90+ dias",
        }
    }
}

/// Employer receivable document, generated by consolidating eligible
/// consumos of one empresa over a period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DocumentoCxc {
    pub id: i64,
    /// Human-facing number, e.g. "CXC-2025-000042"
    pub numero: String,
    pub empresa_id: i64,
    /// Inclusive period start, Unix millis
    pub periodo_desde: i64,
    /// Inclusive period end, Unix millis
    pub periodo_hasta: i64,
    pub fecha_emision: i64,
    pub fecha_vencimiento: i64,
    pub monto_total: f64,
    pub monto_pagado: f64,
    pub monto_pendiente: f64,
    pub cantidad_consumos: i64,
    /// Distinct empleados included
    pub cantidad_empleados: i64,
    pub estado: EstadoDocumento,
    /// Set once the full-payment credit restoration has run; guards against
    /// double-restoration if the transition is re-triggered
    #[serde(default)]
    pub credito_restaurado: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Merchant payable document: gross consumption minus platform commission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DocumentoCxp {
    pub id: i64,
    /// Human-facing number, e.g. "CXP-2025-000042"
    pub numero: String,
    pub proveedor_id: i64,
    pub periodo_desde: i64,
    pub periodo_hasta: i64,
    pub fecha_emision: i64,
    /// Sum of included consumos
    pub monto_bruto: f64,
    /// Commission percentage snapshotted from the proveedor at emission
    pub porcentaje_comision: f64,
    pub monto_comision: f64,
    /// Net payable: monto_bruto - monto_comision
    pub monto_total: f64,
    pub monto_pagado: f64,
    pub monto_pendiente: f64,
    pub cantidad_consumos: i64,
    /// Distinct tiendas included
    pub cantidad_tiendas: i64,
    pub estado: EstadoDocumento,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Document view with the derived overdue fields attached
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentoCxcView {
    #[serde(flatten)]
    pub documento: DocumentoCxc,
    pub dias_vencido: i64,
    pub rango_antiguedad: RangoAntiguedad,
}

/// Consolidation commit request (dates as YYYY-MM-DD, business timezone)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidarRequest {
    pub periodo_desde: String,
    pub periodo_hasta: String,
    /// Days until fecha_vencimiento; falls back to the empresa default.
    /// Ignored for CxP.
    pub dias_para_pagar: Option<i32>,
}

/// CxC consolidation preview: pure projection of the eligible set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCxc {
    pub empresa_id: i64,
    pub periodo_desde: String,
    pub periodo_hasta: String,
    pub cantidad_consumos: i64,
    pub cantidad_empleados: i64,
    pub monto_total: f64,
}

/// CxP consolidation preview, including the commission breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewCxp {
    pub proveedor_id: i64,
    pub periodo_desde: String,
    pub periodo_hasta: String,
    pub cantidad_consumos: i64,
    pub cantidad_tiendas: i64,
    pub monto_bruto: f64,
    pub porcentaje_comision: f64,
    pub monto_comision: f64,
    /// Net payable after commission
    pub monto_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estado_roundtrip() {
        for estado in [
            EstadoDocumento::Pendiente,
            EstadoDocumento::Parcial,
            EstadoDocumento::Pagado,
            EstadoDocumento::Refinanciado,
            EstadoDocumento::Anulado,
        ] {
            let value: u8 = estado.into();
            assert_eq!(EstadoDocumento::try_from(value), Ok(estado));
        }
        assert!(EstadoDocumento::try_from(5).is_err());
    }

    #[test]
    fn test_estado_wire_format_is_integer() {
        let json = serde_json::to_string(&EstadoDocumento::Parcial).unwrap();
        assert_eq!(json, "1");
    }

    #[test]
    fn test_estado_terminal() {
        assert!(!EstadoDocumento::Pendiente.es_terminal());
        assert!(!EstadoDocumento::Parcial.es_terminal());
        assert!(EstadoDocumento::Pagado.es_terminal());
        assert!(EstadoDocumento::Refinanciado.es_terminal());
        assert!(EstadoDocumento::Anulado.es_terminal());
    }

    #[test]
    fn test_rango_labels_on_wire() {
        let json = serde_json::to_string(&RangoAntiguedad::Dias31a60).unwrap();
        assert_eq!(json, "\"31-60 dias\"");
    }

    #[test]
    fn test_rango_boundaries() {
        assert_eq!(RangoAntiguedad::from_dias_vencido(0), RangoAntiguedad::Vigente);
        assert_eq!(RangoAntiguedad::from_dias_vencido(1), RangoAntiguedad::Dias1a30);
        assert_eq!(RangoAntiguedad::from_dias_vencido(30), RangoAntiguedad::Dias1a30);
        assert_eq!(RangoAntiguedad::from_dias_vencido(31), RangoAntiguedad::Dias31a60);
        assert_eq!(RangoAntiguedad::from_dias_vencido(60), RangoAntiguedad::Dias31a60);
        assert_eq!(RangoAntiguedad::from_dias_vencido(90), RangoAntiguedad::Dias61a90);
        assert_eq!(RangoAntiguedad::from_dias_vencido(91), RangoAntiguedad::Mas90);
    }
}
