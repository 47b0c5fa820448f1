//! Empresa Repository

use super::{RepoError, RepoResult};
use shared::models::{Empresa, EmpresaCreate, EmpresaUpdate};
use sqlx::SqlitePool;

const COLS: &str = "id, nombre, rnc, telefono, email, direccion, dia_corte, dias_gracia, dias_para_pagar, corte_automatico, is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Empresa>> {
    let sql = if include_inactive {
        format!("SELECT {COLS} FROM empresa ORDER BY nombre")
    } else {
        format!("SELECT {COLS} FROM empresa WHERE is_active = 1 ORDER BY nombre")
    };
    let empresas = sqlx::query_as::<_, Empresa>(&sql).fetch_all(pool).await?;
    Ok(empresas)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Empresa>> {
    let empresa =
        sqlx::query_as::<_, Empresa>(&format!("SELECT {COLS} FROM empresa WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(empresa)
}

pub async fn find_by_rnc(pool: &SqlitePool, rnc: &str) -> RepoResult<Option<Empresa>> {
    let empresa =
        sqlx::query_as::<_, Empresa>(&format!("SELECT {COLS} FROM empresa WHERE rnc = ? LIMIT 1"))
            .bind(rnc)
            .fetch_optional(pool)
            .await?;
    Ok(empresa)
}

/// Empresas with automatic cut-off enabled, for the scheduler
pub async fn find_corte_automatico(pool: &SqlitePool) -> RepoResult<Vec<Empresa>> {
    let empresas = sqlx::query_as::<_, Empresa>(&format!(
        "SELECT {COLS} FROM empresa WHERE corte_automatico = 1 AND is_active = 1 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(empresas)
}

pub async fn create(pool: &SqlitePool, data: EmpresaCreate) -> RepoResult<Empresa> {
    if find_by_rnc(pool, &data.rnc).await?.is_some() {
        return Err(RepoError::BusinessRule(
            shared::error::ErrorCode::EmpresaRncExists,
            format!("RNC '{}' already registered", data.rnc),
        ));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO empresa (id, nombre, rnc, telefono, email, direccion, dia_corte, dias_gracia, dias_para_pagar, corte_automatico, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&data.nombre)
    .bind(&data.rnc)
    .bind(&data.telefono)
    .bind(&data.email)
    .bind(&data.direccion)
    .bind(data.dia_corte)
    .bind(data.dias_gracia)
    .bind(data.dias_para_pagar)
    .bind(data.corte_automatico)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create empresa".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: EmpresaUpdate) -> RepoResult<Empresa> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE empresa SET \
            nombre = COALESCE(?, nombre), \
            telefono = COALESCE(?, telefono), \
            email = COALESCE(?, email), \
            direccion = COALESCE(?, direccion), \
            dia_corte = COALESCE(?, dia_corte), \
            dias_gracia = COALESCE(?, dias_gracia), \
            dias_para_pagar = COALESCE(?, dias_para_pagar), \
            corte_automatico = COALESCE(?, corte_automatico), \
            is_active = COALESCE(?, is_active), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&data.nombre)
    .bind(&data.telefono)
    .bind(&data.email)
    .bind(&data.direccion)
    .bind(data.dia_corte)
    .bind(data.dias_gracia)
    .bind(data.dias_para_pagar)
    .bind(data.corte_automatico)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Empresa {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Empresa {id} not found")))
}
