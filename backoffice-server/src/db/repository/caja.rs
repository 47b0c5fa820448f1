//! Caja Repository

use super::{RepoError, RepoResult};
use shared::models::{Caja, CajaCreate, CajaUpdate};
use sqlx::SqlitePool;

const COLS: &str = "id, tienda_id, nombre, is_active, created_at, updated_at";

pub async fn find_by_tienda(pool: &SqlitePool, tienda_id: i64) -> RepoResult<Vec<Caja>> {
    let cajas = sqlx::query_as::<_, Caja>(&format!(
        "SELECT {COLS} FROM caja WHERE tienda_id = ? AND is_active = 1 ORDER BY nombre"
    ))
    .bind(tienda_id)
    .fetch_all(pool)
    .await?;
    Ok(cajas)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Caja>> {
    let caja = sqlx::query_as::<_, Caja>(&format!("SELECT {COLS} FROM caja WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(caja)
}

pub async fn create(pool: &SqlitePool, tienda_id: i64, data: CajaCreate) -> RepoResult<Caja> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO caja (id, tienda_id, nombre, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(tienda_id)
    .bind(&data.nombre)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create caja".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CajaUpdate) -> RepoResult<Caja> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE caja SET \
            nombre = COALESCE(?, nombre), \
            is_active = COALESCE(?, is_active), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&data.nombre)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Caja {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Caja {id} not found")))
}

/// Resolve the proveedor/tienda chain for a caja, used when registering a
/// consumo from just the caja id
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct CajaContext {
    pub caja_id: i64,
    pub tienda_id: i64,
    pub proveedor_id: i64,
}

pub async fn resolve_context(pool: &SqlitePool, caja_id: i64) -> RepoResult<Option<CajaContext>> {
    let row: Option<(i64, i64, i64)> = sqlx::query_as(
        "SELECT c.id, c.tienda_id, t.proveedor_id \
         FROM caja c JOIN tienda t ON t.id = c.tienda_id \
         WHERE c.id = ? AND c.is_active = 1 AND t.is_active = 1",
    )
    .bind(caja_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(caja_id, tienda_id, proveedor_id)| CajaContext {
        caja_id,
        tienda_id,
        proveedor_id,
    }))
}
