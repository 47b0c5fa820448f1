//! Empleado Model (employee / credit-line holder)

use serde::{Deserialize, Serialize};

/// Empleado entity: an employee of one empresa consuming against a credit
/// line. Invariant: `0 <= saldo_disponible <= limite_credito`. The balance
/// shrinks when a consumo is registered and is restored when the CxC
/// documento covering that consumo is fully paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Empleado {
    pub id: i64,
    pub empresa_id: i64,
    pub nombre: String,
    pub cedula: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub limite_credito: f64,
    pub saldo_disponible: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Empleado {
    /// Share of the credit line currently consumed, 0-100
    pub fn porcentaje_utilizado(&self) -> f64 {
        if self.limite_credito <= 0.0 {
            return 0.0;
        }
        ((self.limite_credito - self.saldo_disponible) / self.limite_credito * 100.0).clamp(0.0, 100.0)
    }
}

/// Empleado listing row with the derived utilization percentage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpleadoView {
    #[serde(flatten)]
    pub empleado: Empleado,
    pub porcentaje_utilizado: f64,
}

impl From<Empleado> for EmpleadoView {
    fn from(empleado: Empleado) -> Self {
        let porcentaje_utilizado = empleado.porcentaje_utilizado();
        Self {
            empleado,
            porcentaje_utilizado,
        }
    }
}

/// Create empleado payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpleadoCreate {
    pub empresa_id: i64,
    pub nombre: String,
    pub cedula: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub limite_credito: f64,
}

/// Update empleado payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpleadoUpdate {
    pub nombre: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub limite_credito: Option<f64>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empleado(limite: f64, saldo: f64) -> Empleado {
        Empleado {
            id: 1,
            empresa_id: 1,
            nombre: "Ana Pérez".into(),
            cedula: "001-0000000-1".into(),
            telefono: None,
            email: None,
            limite_credito: limite,
            saldo_disponible: saldo,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_porcentaje_utilizado() {
        assert_eq!(empleado(1000.0, 1000.0).porcentaje_utilizado(), 0.0);
        assert_eq!(empleado(1000.0, 250.0).porcentaje_utilizado(), 75.0);
        assert_eq!(empleado(1000.0, 0.0).porcentaje_utilizado(), 100.0);
    }

    #[test]
    fn test_porcentaje_utilizado_zero_limit() {
        assert_eq!(empleado(0.0, 0.0).porcentaje_utilizado(), 0.0);
    }
}
