use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// Every item can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | TIMEZONE | America/Santo_Domingo | Business timezone |
/// | CORTE_CHECK_INTERVAL_SECS | 3600 | Auto-cutoff scheduler poll interval |
/// | JWT_SECRET / JWT_EXPIRATION_MINUTES | - | JWT auth settings |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/var/lib/credinomina HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT auth settings
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    /// Business timezone; all date boundaries are computed in it
    pub timezone: Tz,
    /// Poll interval of the automatic-cutoff scheduler, seconds
    pub corte_check_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults when unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::America::Santo_Domingo),
            corte_check_interval_secs: std::env::var("CORTE_CHECK_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3600),
        }
    }

    /// Override parts of the configuration, mostly for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Path of the SQLite database file
    pub fn db_path(&self) -> String {
        format!("{}/backoffice.db", self.work_dir)
    }

    /// Path of the log directory
    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
