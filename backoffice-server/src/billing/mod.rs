//! Billing Engine
//!
//! The domain core: consolidation of consumos into CxC/CxP documentos,
//! payment application, aging classification, reversal and the documento
//! lifecycle (anulación, refinanciamiento).
//!
//! Concurrency model: every payment application serializes on a per-document
//! async mutex, and every consolidation on a per-payer mutex, both held in
//! DashMap registries. The database transaction gives atomicity; the lock
//! gives the check-then-write sequences their isolation.

pub mod aging;
pub mod consolidation;
pub mod lifecycle;
pub mod money;
pub mod payments;
pub mod reportes;
pub mod reversal;

use chrono_tz::Tz;
use dashmap::DashMap;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Billing domain service, shared behind an `Arc` in the server state
pub struct BillingService {
    pool: SqlitePool,
    timezone: Tz,
    /// Per-documento write locks (cobros, pagos, lifecycle transitions)
    doc_locks: DashMap<i64, Arc<Mutex<()>>>,
    /// Per-payer consolidation locks (empresa or proveedor id)
    payer_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl BillingService {
    pub fn new(pool: SqlitePool, timezone: Tz) -> Self {
        Self {
            pool,
            timezone,
            doc_locks: DashMap::new(),
            payer_locks: DashMap::new(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub(crate) fn doc_lock(&self, documento_id: i64) -> Arc<Mutex<()>> {
        self.doc_locks
            .entry(documento_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub(crate) fn payer_lock(&self, payer_id: i64) -> Arc<Mutex<()>> {
        self.payer_locks
            .entry(payer_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Evict a documento's lock entry once no task holds a handle to it.
    /// Called after terminal transitions; a terminal documento takes no
    /// further writes, so the registry stays bounded by the open documentos.
    pub(crate) fn release_doc_lock(&self, documento_id: i64) {
        self.doc_locks
            .remove_if(&documento_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::BillingService;
    use crate::db::{repository, DbService};
    use shared::models::{
        CajaCreate, EmpleadoCreate, EmpresaCreate, ProveedorCreate, TiendaCreate,
    };
    use sqlx::SqlitePool;

    pub const USUARIO_TEST: i64 = 42;

    pub struct Fixture {
        pub empresa_id: i64,
        pub proveedor_id: i64,
        pub tienda_id: i64,
        pub caja_id: i64,
        pub empleado_id: i64,
    }

    pub async fn service() -> BillingService {
        let db = DbService::new_in_memory().await.unwrap();
        BillingService::new(db.pool, chrono_tz::America::Santo_Domingo)
    }

    /// One empresa, one proveedor at 8% commission with a tienda/caja chain,
    /// one empleado with a 5000.00 credit line.
    pub async fn seed(pool: &SqlitePool) -> Fixture {
        let empresa = repository::empresa::create(
            pool,
            EmpresaCreate {
                nombre: "Industrias Rodríguez".into(),
                rnc: "101-00001-1".into(),
                telefono: None,
                email: None,
                direccion: None,
                dia_corte: 28,
                dias_gracia: 0,
                dias_para_pagar: 30,
                corte_automatico: false,
            },
        )
        .await
        .unwrap();

        let proveedor = repository::proveedor::create(
            pool,
            ProveedorCreate {
                nombre: "Supermercado La Economía".into(),
                rnc: "102-00002-2".into(),
                telefono: None,
                email: None,
                direccion: None,
                porcentaje_comision: 8.0,
            },
        )
        .await
        .unwrap();

        let tienda = repository::tienda::create(
            pool,
            proveedor.id,
            TiendaCreate {
                nombre: "Sucursal Centro".into(),
                direccion: None,
                telefono: None,
            },
        )
        .await
        .unwrap();

        let caja = repository::caja::create(
            pool,
            tienda.id,
            CajaCreate {
                nombre: "Caja 1".into(),
            },
        )
        .await
        .unwrap();

        let empleado = repository::empleado::create(
            pool,
            EmpleadoCreate {
                empresa_id: empresa.id,
                nombre: "Ana Pérez".into(),
                cedula: "001-0000001-1".into(),
                telefono: None,
                email: None,
                limite_credito: 5000.0,
            },
        )
        .await
        .unwrap();

        Fixture {
            empresa_id: empresa.id,
            proveedor_id: proveedor.id,
            tienda_id: tienda.id,
            caja_id: caja.id,
            empleado_id: empleado.id,
        }
    }

    /// Register a consumo directly through the repository path
    pub async fn consumo(pool: &SqlitePool, fx: &Fixture, monto: f64) -> i64 {
        let consumo = repository::consumo::create(
            pool,
            repository::consumo::NewConsumo {
                empleado_id: fx.empleado_id,
                empresa_id: fx.empresa_id,
                proveedor_id: fx.proveedor_id,
                tienda_id: fx.tienda_id,
                caja_id: fx.caja_id,
                monto,
                concepto: None,
                referencia: None,
                registrado_por: USUARIO_TEST,
                fecha: shared::util::now_millis(),
            },
        )
        .await
        .unwrap();
        consumo.id
    }
}
