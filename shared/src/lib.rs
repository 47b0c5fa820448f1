//! Shared types for the CrediNómina back-office
//!
//! Common types used across the workspace: wire-level DTOs for the billing
//! domain, the unified error system and API response envelope, pagination,
//! and small time/id utilities.

pub mod error;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use pagination::PaginatedResponse;
