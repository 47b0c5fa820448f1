//! CrediNómina Back-Office Server
//!
//! Consumption-credit platform back office: empleados consume against a
//! payroll-backed credit line at affiliated merchants, empresas are billed
//! through consolidated CxC documentos and proveedores are paid net of
//! commission through CxP documentos.
//!
//! # Module structure
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # Config, state, server lifecycle
//! ├── auth/          # JWT authentication, role permissions
//! ├── billing/       # Consolidation, payments, aging, reversal
//! ├── api/           # HTTP routes and handlers
//! ├── tasks/         # Automatic cut-off scheduler
//! ├── db/            # SQLite pool, migrations, repositories
//! └── utils/         # Time, validation, logging helpers
//! ```

pub mod api;
pub mod auth;
pub mod billing;
pub mod core;
pub mod db;
pub mod tasks;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use billing::BillingService;
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: .env file, work directory, logging.
///
/// Runs before [`Config::from_env`]; reads the same variables the config
/// does but only the ones needed to bootstrap logging.
pub fn setup_environment() -> core::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".to_string());
    let log_dir = format!("{}/logs", work_dir);
    std::fs::create_dir_all(&log_dir)?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), Some(&log_dir));
    Ok(())
}

pub fn print_banner() {
    println!("=========================================");
    println!("  CrediNómina Back-Office  v{}", env!("CARGO_PKG_VERSION"));
    println!("=========================================");
}
