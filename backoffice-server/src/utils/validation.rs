//! Input validation helpers
//!
//! Centralized text length constants and validation functions. SQLite TEXT
//! has no built-in length enforcement, so the handler layer guards here.

use super::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: empresa, proveedor, tienda, caja, empleado, usuario
pub const MAX_NAME_LEN: usize = 200;

/// Notes, conceptos, free-text references
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: RNC, cédula, phone, bank account numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a monetary amount is finite and strictly positive
pub fn validate_monto_positivo(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value <= 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Validate a monetary amount is finite and non-negative
pub fn validate_monto_no_negativo(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Validate a commission percentage is within [0, 100]
pub fn validate_porcentaje(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::with_message(
            shared::error::ErrorCode::InvalidComision,
            format!("{field} must be between 0 and 100, got {value}"),
        ));
    }
    Ok(())
}

/// Validate a cut-off day of month (1-28, so every month has one)
pub fn validate_dia_corte(value: i32) -> Result<(), AppError> {
    if !(1..=28).contains(&value) {
        return Err(AppError::validation(format!(
            "diaCorte must be between 1 and 28, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Farmacia Carol", "nombre", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "nombre", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "nombre", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_monto_positivo() {
        assert!(validate_monto_positivo(100.0, "monto").is_ok());
        assert!(validate_monto_positivo(0.0, "monto").is_err());
        assert!(validate_monto_positivo(-5.0, "monto").is_err());
        assert!(validate_monto_positivo(f64::NAN, "monto").is_err());
        assert!(validate_monto_positivo(f64::INFINITY, "monto").is_err());
    }

    #[test]
    fn test_porcentaje() {
        assert!(validate_porcentaje(0.0, "porcentajeComision").is_ok());
        assert!(validate_porcentaje(100.0, "porcentajeComision").is_ok());
        assert!(validate_porcentaje(100.1, "porcentajeComision").is_err());
        assert!(validate_porcentaje(-1.0, "porcentajeComision").is_err());
    }

    #[test]
    fn test_dia_corte() {
        assert!(validate_dia_corte(1).is_ok());
        assert!(validate_dia_corte(28).is_ok());
        assert!(validate_dia_corte(0).is_err());
        assert!(validate_dia_corte(29).is_err());
    }
}
