//! Consumo Repository
//!
//! Registration runs in its own transaction: the credit deduction and the
//! insert either both land or neither does. Listing is filter + page driven
//! and always joins display names for the back-office tables.

use super::{empleado, RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Consumo, ConsumoDetalle};
use shared::pagination::PaginatedResponse;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const COLS: &str = "id, empleado_id, empresa_id, proveedor_id, tienda_id, caja_id, monto, concepto, referencia, registrado_por, fecha, reversado, reversado_utc, documento_cxc_id, documento_cxp_id, created_at";

/// Fully resolved registration payload; the handler expands the wire
/// `ConsumoCreate` against the caja chain before calling [`create`]
#[derive(Debug, Clone)]
pub struct NewConsumo {
    pub empleado_id: i64,
    pub empresa_id: i64,
    pub proveedor_id: i64,
    pub tienda_id: i64,
    pub caja_id: i64,
    pub monto: f64,
    pub concepto: Option<String>,
    pub referencia: Option<String>,
    pub registrado_por: i64,
    pub fecha: i64,
}

/// Listing filters, all optional. `desde`/`hasta` are Unix millis, already
/// converted from wire dates at the handler layer.
#[derive(Debug, Clone, Default)]
pub struct ConsumoFilter {
    pub empresa_id: Option<i64>,
    pub proveedor_id: Option<i64>,
    pub empleado_id: Option<i64>,
    pub desde: Option<i64>,
    pub hasta: Option<i64>,
    pub solo_reversados: bool,
    /// Matches empleado nombre/cedula or the consumo referencia
    pub busqueda: Option<String>,
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a ConsumoFilter) {
    if let Some(empresa_id) = filter.empresa_id {
        qb.push(" AND c.empresa_id = ").push_bind(empresa_id);
    }
    if let Some(proveedor_id) = filter.proveedor_id {
        qb.push(" AND c.proveedor_id = ").push_bind(proveedor_id);
    }
    if let Some(empleado_id) = filter.empleado_id {
        qb.push(" AND c.empleado_id = ").push_bind(empleado_id);
    }
    if let Some(desde) = filter.desde {
        qb.push(" AND c.fecha >= ").push_bind(desde);
    }
    if let Some(hasta) = filter.hasta {
        qb.push(" AND c.fecha < ").push_bind(hasta);
    }
    if filter.solo_reversados {
        qb.push(" AND c.reversado = 1");
    }
    if let Some(busqueda) = &filter.busqueda {
        let pattern = format!("%{busqueda}%");
        qb.push(" AND (e.nombre LIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.cedula LIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.referencia LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

const LIST_JOINS: &str = " FROM consumo c \
    JOIN empleado e ON e.id = c.empleado_id \
    JOIN empresa em ON em.id = c.empresa_id \
    JOIN proveedor p ON p.id = c.proveedor_id \
    JOIN tienda t ON t.id = c.tienda_id \
    JOIN caja cj ON cj.id = c.caja_id \
    WHERE 1 = 1";

pub async fn list(
    pool: &SqlitePool,
    filter: &ConsumoFilter,
    page: u32,
    page_size: u32,
) -> RepoResult<PaginatedResponse<ConsumoDetalle>> {
    let mut count_qb = QueryBuilder::new(format!("SELECT COUNT(*) {LIST_JOINS}"));
    push_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::new(format!(
        "SELECT c.id, c.empleado_id, e.nombre AS empleado_nombre, \
         c.empresa_id, em.nombre AS empresa_nombre, \
         c.proveedor_id, p.nombre AS proveedor_nombre, \
         t.nombre AS tienda_nombre, cj.nombre AS caja_nombre, \
         c.monto, c.concepto, c.referencia, c.fecha, c.reversado, c.reversado_utc \
         {LIST_JOINS}"
    ));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY c.fecha DESC, c.id DESC LIMIT ")
        .push_bind(page_size as i64)
        .push(" OFFSET ")
        .push_bind((page.saturating_sub(1) as i64) * page_size as i64);

    let rows: Vec<ConsumoDetalle> = qb.build_query_as().fetch_all(pool).await?;
    Ok(PaginatedResponse::new(rows, total as u64, page, page_size))
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Consumo>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let consumo =
        sqlx::query_as::<_, Consumo>(&format!("SELECT {COLS} FROM consumo WHERE id = ?"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
    Ok(consumo)
}

/// Register a consumo. The empleado's balance deduction and the insert run
/// in one transaction; a failed credit guard distinguishes a missing or
/// inactive empleado from an insufficient balance.
pub async fn create(pool: &SqlitePool, data: NewConsumo) -> RepoResult<Consumo> {
    if data.monto <= 0.0 {
        return Err(RepoError::BusinessRule(
            ErrorCode::ConsumoMontoInvalido,
            "monto must be positive".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let deducted = empleado::descontar_credito(&mut *tx, data.empleado_id, data.monto).await?;
    if !deducted {
        tx.rollback().await?;
        let empleado = empleado::find_by_id(pool, data.empleado_id).await?;
        return match empleado {
            None => Err(RepoError::BusinessRule(
                ErrorCode::EmpleadoNotFound,
                format!("Empleado {} not found", data.empleado_id),
            )),
            Some(e) if !e.is_active => Err(RepoError::BusinessRule(
                ErrorCode::EmpleadoInactive,
                format!("Empleado {} is inactive", data.empleado_id),
            )),
            Some(e) => Err(RepoError::BusinessRule(
                ErrorCode::CreditoInsuficiente,
                format!(
                    "Saldo disponible {:.2} is below the requested {:.2}",
                    e.saldo_disponible, data.monto
                ),
            )),
        };
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO consumo (id, empleado_id, empresa_id, proveedor_id, tienda_id, caja_id, monto, concepto, referencia, registrado_por, fecha, reversado, reversado_utc, documento_cxc_id, documento_cxp_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NULL, NULL, NULL, ?)",
    )
    .bind(id)
    .bind(data.empleado_id)
    .bind(data.empresa_id)
    .bind(data.proveedor_id)
    .bind(data.tienda_id)
    .bind(data.caja_id)
    .bind(data.monto)
    .bind(&data.concepto)
    .bind(&data.referencia)
    .bind(data.registrado_por)
    .bind(data.fecha)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create consumo".into()))
}
