//! Unified error codes for the back-office
//!
//! This module defines all error codes used across the server and its
//! clients. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Empresa/Proveedor (payer) errors
//! - 4xxx: Documento (CxC/CxP) errors
//! - 5xxx: Cobro/Pago (payment application) errors
//! - 6xxx: Consumo errors
//! - 7xxx: Empleado/credit-line errors
//! - 8xxx: Usuario errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Invalid date range (desde > hasta)
    InvalidDateRange = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Empresa / Proveedor ====================
    /// Empresa not found
    EmpresaNotFound = 3001,
    /// Empresa RNC already registered
    EmpresaRncExists = 3002,
    /// Empresa is inactive
    EmpresaInactive = 3003,
    /// Proveedor not found
    ProveedorNotFound = 3101,
    /// Proveedor RNC already registered
    ProveedorRncExists = 3102,
    /// Proveedor is inactive
    ProveedorInactive = 3103,
    /// Invalid commission percentage
    InvalidComision = 3104,
    /// Tienda not found
    TiendaNotFound = 3201,
    /// Caja not found
    CajaNotFound = 3301,

    // ==================== 4xxx: Documento ====================
    /// Documento not found
    DocumentoNotFound = 4001,
    /// Documento already fully paid
    DocumentoAlreadyPagado = 4002,
    /// Documento already voided
    DocumentoAlreadyAnulado = 4003,
    /// Documento already refinanced
    DocumentoAlreadyRefinanciado = 4004,
    /// Documento has applied payments
    DocumentoHasPayments = 4005,
    /// Nothing to consolidate for the requested period
    NadaQueConsolidar = 4006,
    /// Documento is in a terminal state
    DocumentoTerminal = 4007,

    // ==================== 5xxx: Cobro / Pago ====================
    /// Payment processing failed
    PagoFailed = 5001,
    /// Payment amount exceeds pending balance
    PagoExcedeSaldoPendiente = 5002,
    /// Invalid payment method
    PagoInvalidMetodo = 5003,
    /// Payment amount must be positive
    PagoMontoInvalido = 5004,

    // ==================== 6xxx: Consumo ====================
    /// Consumo not found
    ConsumoNotFound = 6001,
    /// Consumo already reversed
    ConsumoAlreadyReversado = 6002,
    /// Consumo already billed on a progressed document
    ConsumoYaFacturado = 6003,
    /// Consumo amount invalid
    ConsumoMontoInvalido = 6004,

    // ==================== 7xxx: Empleado / Credit ====================
    /// Empleado not found
    EmpleadoNotFound = 7001,
    /// Insufficient available credit
    CreditoInsuficiente = 7002,
    /// Empleado is inactive
    EmpleadoInactive = 7003,
    /// Invalid credit limit
    LimiteCreditoInvalido = 7004,

    // ==================== 8xxx: Usuario ====================
    /// Usuario not found
    UsuarioNotFound = 8001,
    /// Username already exists
    UsuarioExists = 8002,
    /// Cannot delete self
    UsuarioCannotDeleteSelf = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::InvalidDateRange => "Invalid date range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "A specific role is required",
            ErrorCode::AdminRequired => "Admin role is required",

            // Empresa / Proveedor
            ErrorCode::EmpresaNotFound => "Empresa not found",
            ErrorCode::EmpresaRncExists => "Empresa RNC already registered",
            ErrorCode::EmpresaInactive => "Empresa is inactive",
            ErrorCode::ProveedorNotFound => "Proveedor not found",
            ErrorCode::ProveedorRncExists => "Proveedor RNC already registered",
            ErrorCode::ProveedorInactive => "Proveedor is inactive",
            ErrorCode::InvalidComision => "Commission percentage must be between 0 and 100",
            ErrorCode::TiendaNotFound => "Tienda not found",
            ErrorCode::CajaNotFound => "Caja not found",

            // Documento
            ErrorCode::DocumentoNotFound => "Documento not found",
            ErrorCode::DocumentoAlreadyPagado => "Documento has already been fully paid",
            ErrorCode::DocumentoAlreadyAnulado => "Documento has already been voided",
            ErrorCode::DocumentoAlreadyRefinanciado => "Documento has already been refinanced",
            ErrorCode::DocumentoHasPayments => "Documento has applied payments",
            ErrorCode::NadaQueConsolidar => "No eligible consumos to consolidate",
            ErrorCode::DocumentoTerminal => "Documento is in a terminal state",

            // Cobro / Pago
            ErrorCode::PagoFailed => "Payment processing failed",
            ErrorCode::PagoExcedeSaldoPendiente => "Payment amount exceeds pending balance",
            ErrorCode::PagoInvalidMetodo => "Invalid payment method",
            ErrorCode::PagoMontoInvalido => "Payment amount must be positive",

            // Consumo
            ErrorCode::ConsumoNotFound => "Consumo not found",
            ErrorCode::ConsumoAlreadyReversado => "Consumo has already been reversed",
            ErrorCode::ConsumoYaFacturado => "Consumo is attached to a progressed documento",
            ErrorCode::ConsumoMontoInvalido => "Consumo amount is invalid",

            // Empleado / Credit
            ErrorCode::EmpleadoNotFound => "Empleado not found",
            ErrorCode::CreditoInsuficiente => "Insufficient available credit",
            ErrorCode::EmpleadoInactive => "Empleado is inactive",
            ErrorCode::LimiteCreditoInvalido => "Invalid credit limit",

            // Usuario
            ErrorCode::UsuarioNotFound => "Usuario not found",
            ErrorCode::UsuarioExists => "Username already exists",
            ErrorCode::UsuarioCannotDeleteSelf => "Cannot delete your own account",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}: {}", self.code(), self.message())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,
            9 => Self::InvalidDateRange,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1005 => Self::AccountDisabled,

            2001 => Self::PermissionDenied,
            2002 => Self::RoleRequired,
            2003 => Self::AdminRequired,

            3001 => Self::EmpresaNotFound,
            3002 => Self::EmpresaRncExists,
            3003 => Self::EmpresaInactive,
            3101 => Self::ProveedorNotFound,
            3102 => Self::ProveedorRncExists,
            3103 => Self::ProveedorInactive,
            3104 => Self::InvalidComision,
            3201 => Self::TiendaNotFound,
            3301 => Self::CajaNotFound,

            4001 => Self::DocumentoNotFound,
            4002 => Self::DocumentoAlreadyPagado,
            4003 => Self::DocumentoAlreadyAnulado,
            4004 => Self::DocumentoAlreadyRefinanciado,
            4005 => Self::DocumentoHasPayments,
            4006 => Self::NadaQueConsolidar,
            4007 => Self::DocumentoTerminal,

            5001 => Self::PagoFailed,
            5002 => Self::PagoExcedeSaldoPendiente,
            5003 => Self::PagoInvalidMetodo,
            5004 => Self::PagoMontoInvalido,

            6001 => Self::ConsumoNotFound,
            6002 => Self::ConsumoAlreadyReversado,
            6003 => Self::ConsumoYaFacturado,
            6004 => Self::ConsumoMontoInvalido,

            7001 => Self::EmpleadoNotFound,
            7002 => Self::CreditoInsuficiente,
            7003 => Self::EmpleadoInactive,
            7004 => Self::LimiteCreditoInvalido,

            8001 => Self::UsuarioNotFound,
            8002 => Self::UsuarioExists,
            8003 => Self::UsuarioCannotDeleteSelf,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::NetworkError,
            9004 => Self::TimeoutError,
            9005 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::EmpresaNotFound,
            ErrorCode::NadaQueConsolidar,
            ErrorCode::PagoExcedeSaldoPendiente,
            ErrorCode::ConsumoAlreadyReversado,
            ErrorCode::CreditoInsuficiente,
            ErrorCode::InternalError,
        ];
        for code in codes {
            let value: u16 = code.into();
            assert_eq!(ErrorCode::try_from(value), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serde_as_u16() {
        let json = serde_json::to_string(&ErrorCode::PagoExcedeSaldoPendiente).unwrap();
        assert_eq!(json, "5002");
        let code: ErrorCode = serde_json::from_str("4006").unwrap();
        assert_eq!(code, ErrorCode::NadaQueConsolidar);
    }
}
