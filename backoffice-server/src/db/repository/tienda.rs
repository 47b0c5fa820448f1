//! Tienda Repository

use super::{RepoError, RepoResult};
use shared::models::{Tienda, TiendaCreate, TiendaUpdate};
use sqlx::SqlitePool;

const COLS: &str = "id, proveedor_id, nombre, direccion, telefono, is_active, created_at, updated_at";

pub async fn find_by_proveedor(pool: &SqlitePool, proveedor_id: i64) -> RepoResult<Vec<Tienda>> {
    let tiendas = sqlx::query_as::<_, Tienda>(&format!(
        "SELECT {COLS} FROM tienda WHERE proveedor_id = ? AND is_active = 1 ORDER BY nombre"
    ))
    .bind(proveedor_id)
    .fetch_all(pool)
    .await?;
    Ok(tiendas)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Tienda>> {
    let tienda = sqlx::query_as::<_, Tienda>(&format!("SELECT {COLS} FROM tienda WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(tienda)
}

pub async fn create(
    pool: &SqlitePool,
    proveedor_id: i64,
    data: TiendaCreate,
) -> RepoResult<Tienda> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO tienda (id, proveedor_id, nombre, direccion, telefono, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(proveedor_id)
    .bind(&data.nombre)
    .bind(&data.direccion)
    .bind(&data.telefono)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tienda".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TiendaUpdate) -> RepoResult<Tienda> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE tienda SET \
            nombre = COALESCE(?, nombre), \
            direccion = COALESCE(?, direccion), \
            telefono = COALESCE(?, telefono), \
            is_active = COALESCE(?, is_active), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&data.nombre)
    .bind(&data.direccion)
    .bind(&data.telefono)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Tienda {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Tienda {id} not found")))
}
