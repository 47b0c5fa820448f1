//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Payer (empresa/proveedor) errors
/// - 4xxx: Documento errors
/// - 5xxx: Payment application errors
/// - 6xxx: Consumo errors
/// - 7xxx: Empleado/credit errors
/// - 8xxx: Usuario errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Payer configuration errors (3xxx)
    Payer,
    /// Documento errors (4xxx)
    Documento,
    /// Payment application errors (5xxx)
    Pago,
    /// Consumo errors (6xxx)
    Consumo,
    /// Empleado/credit errors (7xxx)
    Empleado,
    /// Usuario errors (8xxx)
    Usuario,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Payer,
            4000..5000 => Self::Documento,
            5000..6000 => Self::Pago,
            6000..7000 => Self::Consumo,
            7000..8000 => Self::Empleado,
            8000..9000 => Self::Usuario,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Payer => "payer",
            Self::Documento => "documento",
            Self::Pago => "pago",
            Self::Consumo => "consumo",
            Self::Empleado => "empleado",
            Self::Usuario => "usuario",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Payer);
        assert_eq!(ErrorCategory::from_code(4006), ErrorCategory::Documento);
        assert_eq!(ErrorCategory::from_code(5002), ErrorCategory::Pago);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Consumo);
        assert_eq!(ErrorCategory::from_code(7002), ErrorCategory::Empleado);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Usuario);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::PagoExcedeSaldoPendiente.category(),
            ErrorCategory::Pago
        );
        assert_eq!(
            ErrorCode::CreditoInsuficiente.category(),
            ErrorCategory::Empleado
        );
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Documento).unwrap();
        assert_eq!(json, "\"documento\"");
        let category: ErrorCategory = serde_json::from_str("\"pago\"").unwrap();
        assert_eq!(category, ErrorCategory::Pago);
    }
}
