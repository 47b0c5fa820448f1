//! Repository Module
//!
//! CRUD operations per table, as free functions over the shared pool.
//! Handlers convert [`RepoError`] into the API-level `AppError`. Date
//! filtering always arrives as `i64` Unix millis; conversion from wire
//! dates happens at the handler layer.

// Payers
pub mod empresa;
pub mod proveedor;

// Merchant structure
pub mod caja;
pub mod tienda;

// Credit lines
pub mod empleado;

// Consumption
pub mod consumo;

// Billing documents
pub mod documento_cxc;
pub mod documento_cxp;

// Auth
pub mod usuario;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain rule violation carrying its precise error code
    #[error("{1}")]
    BusinessRule(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::BusinessRule(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
