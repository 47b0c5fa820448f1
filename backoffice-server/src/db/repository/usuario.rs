//! Usuario Repository

use super::{RepoError, RepoResult};
use crate::auth::password::hash_password;
use shared::error::ErrorCode;
use shared::models::{Usuario, UsuarioCreate, UsuarioUpdate};
use sqlx::SqlitePool;

const COLS: &str = "id, username, nombre, hash_pass, rol, empresa_id, caja_id, empleado_id, is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Usuario>> {
    let usuarios =
        sqlx::query_as::<_, Usuario>(&format!("SELECT {COLS} FROM usuario ORDER BY username"))
            .fetch_all(pool)
            .await?;
    Ok(usuarios)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Usuario>> {
    let usuario =
        sqlx::query_as::<_, Usuario>(&format!("SELECT {COLS} FROM usuario WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(usuario)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<Usuario>> {
    let usuario = sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {COLS} FROM usuario WHERE username = ? LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(usuario)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuario")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: UsuarioCreate) -> RepoResult<Usuario> {
    if find_by_username(pool, &data.username).await?.is_some() {
        return Err(RepoError::BusinessRule(
            ErrorCode::UsuarioExists,
            format!("Username '{}' already exists", data.username),
        ));
    }

    let hash_pass =
        hash_password(&data.password).map_err(|e| RepoError::Database(e.to_string()))?;
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO usuario (id, username, nombre, hash_pass, rol, empresa_id, caja_id, empleado_id, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&data.username)
    .bind(&data.nombre)
    .bind(&hash_pass)
    .bind(data.rol)
    .bind(data.empresa_id)
    .bind(data.caja_id)
    .bind(data.empleado_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create usuario".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: UsuarioUpdate) -> RepoResult<Usuario> {
    let hash_pass = match &data.password {
        Some(password) => {
            Some(hash_password(password).map_err(|e| RepoError::Database(e.to_string()))?)
        }
        None => None,
    };

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE usuario SET \
            hash_pass = COALESCE(?, hash_pass), \
            nombre = COALESCE(?, nombre), \
            rol = COALESCE(?, rol), \
            empresa_id = COALESCE(?, empresa_id), \
            caja_id = COALESCE(?, caja_id), \
            empleado_id = COALESCE(?, empleado_id), \
            is_active = COALESCE(?, is_active), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&hash_pass)
    .bind(&data.nombre)
    .bind(data.rol)
    .bind(data.empresa_id)
    .bind(data.caja_id)
    .bind(data.empleado_id)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Usuario {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Usuario {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM usuario WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Usuario {id} not found")));
    }
    Ok(())
}
