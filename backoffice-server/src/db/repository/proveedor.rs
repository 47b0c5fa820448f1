//! Proveedor Repository

use super::{RepoError, RepoResult};
use shared::models::{Proveedor, ProveedorCreate, ProveedorUpdate};
use sqlx::SqlitePool;

const COLS: &str = "id, nombre, rnc, telefono, email, direccion, porcentaje_comision, is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Proveedor>> {
    let sql = if include_inactive {
        format!("SELECT {COLS} FROM proveedor ORDER BY nombre")
    } else {
        format!("SELECT {COLS} FROM proveedor WHERE is_active = 1 ORDER BY nombre")
    };
    let proveedores = sqlx::query_as::<_, Proveedor>(&sql).fetch_all(pool).await?;
    Ok(proveedores)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Proveedor>> {
    let proveedor =
        sqlx::query_as::<_, Proveedor>(&format!("SELECT {COLS} FROM proveedor WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(proveedor)
}

pub async fn find_by_rnc(pool: &SqlitePool, rnc: &str) -> RepoResult<Option<Proveedor>> {
    let proveedor = sqlx::query_as::<_, Proveedor>(&format!(
        "SELECT {COLS} FROM proveedor WHERE rnc = ? LIMIT 1"
    ))
    .bind(rnc)
    .fetch_optional(pool)
    .await?;
    Ok(proveedor)
}

pub async fn create(pool: &SqlitePool, data: ProveedorCreate) -> RepoResult<Proveedor> {
    if find_by_rnc(pool, &data.rnc).await?.is_some() {
        return Err(RepoError::BusinessRule(
            shared::error::ErrorCode::ProveedorRncExists,
            format!("RNC '{}' already registered", data.rnc),
        ));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO proveedor (id, nombre, rnc, telefono, email, direccion, porcentaje_comision, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&data.nombre)
    .bind(&data.rnc)
    .bind(&data.telefono)
    .bind(&data.email)
    .bind(&data.direccion)
    .bind(data.porcentaje_comision)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create proveedor".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProveedorUpdate) -> RepoResult<Proveedor> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE proveedor SET \
            nombre = COALESCE(?, nombre), \
            telefono = COALESCE(?, telefono), \
            email = COALESCE(?, email), \
            direccion = COALESCE(?, direccion), \
            porcentaje_comision = COALESCE(?, porcentaje_comision), \
            is_active = COALESCE(?, is_active), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&data.nombre)
    .bind(&data.telefono)
    .bind(&data.email)
    .bind(&data.direccion)
    .bind(data.porcentaje_comision)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Proveedor {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Proveedor {id} not found")))
}
