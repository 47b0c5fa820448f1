use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::billing::BillingService;
use crate::core::Config;
use crate::db::DbService;

/// Server state: shared handles to every service
///
/// Cloned into each request handler; all members are cheap shallow copies
/// (`Arc` or pool handles).
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | Immutable configuration |
/// | pool | SqlitePool | Embedded database |
/// | jwt_service | Arc<JwtService> | Token issue/validation |
/// | billing | Arc<BillingService> | Consolidation + payment engine |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub billing: Arc<BillingService>,
}

impl ServerState {
    /// Initialize every service from the configuration.
    ///
    /// Creates the work directory, opens the database (running migrations)
    /// and seeds the initial admin user when the usuario table is empty.
    pub async fn initialize(config: &Config) -> crate::core::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db = DbService::new(&config.db_path())
            .await
            .map_err(|e| crate::core::ServerError::Database(e.to_string()))?;

        crate::db::seed_admin_if_empty(&db.pool)
            .await
            .map_err(|e| crate::core::ServerError::Database(e.to_string()))?;

        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let billing = Arc::new(BillingService::new(db.pool.clone(), config.timezone));

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service,
            billing,
        })
    }

    /// In-memory state for tests: SQLite in-memory database, default config
    #[cfg(test)]
    pub async fn for_tests() -> Self {
        let db = DbService::new_in_memory().await.expect("in-memory db");
        let config = Config::with_overrides("./test-data", 0);
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let billing = Arc::new(BillingService::new(db.pool.clone(), config.timezone));
        Self {
            config,
            pool: db.pool,
            jwt_service,
            billing,
        }
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
