//! Utility module: logging, time conversion and input validation helpers

pub mod logger;
pub mod time;
pub mod validation;

// Re-export the unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
