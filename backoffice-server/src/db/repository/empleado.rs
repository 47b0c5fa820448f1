//! Empleado Repository
//!
//! The credit-line invariant `0 <= saldo_disponible <= limite_credito` is
//! enforced here at the SQL level: deductions carry a guard clause and
//! restorations clamp against the limit.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Empleado, EmpleadoCreate, EmpleadoUpdate};
use sqlx::SqlitePool;

const COLS: &str = "id, empresa_id, nombre, cedula, telefono, email, limite_credito, saldo_disponible, is_active, created_at, updated_at";

/// Tolerance for floating comparisons against stored balances
pub const SALDO_EPSILON: f64 = 0.005;

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Empleado>> {
    let sql = if include_inactive {
        format!("SELECT {COLS} FROM empleado ORDER BY nombre")
    } else {
        format!("SELECT {COLS} FROM empleado WHERE is_active = 1 ORDER BY nombre")
    };
    let empleados = sqlx::query_as::<_, Empleado>(&sql).fetch_all(pool).await?;
    Ok(empleados)
}

pub async fn find_by_empresa(pool: &SqlitePool, empresa_id: i64) -> RepoResult<Vec<Empleado>> {
    let empleados = sqlx::query_as::<_, Empleado>(&format!(
        "SELECT {COLS} FROM empleado WHERE empresa_id = ? AND is_active = 1 ORDER BY nombre"
    ))
    .bind(empresa_id)
    .fetch_all(pool)
    .await?;
    Ok(empleados)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Empleado>> {
    let empleado =
        sqlx::query_as::<_, Empleado>(&format!("SELECT {COLS} FROM empleado WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(empleado)
}

pub async fn find_by_cedula(pool: &SqlitePool, cedula: &str) -> RepoResult<Option<Empleado>> {
    let empleado = sqlx::query_as::<_, Empleado>(&format!(
        "SELECT {COLS} FROM empleado WHERE cedula = ? LIMIT 1"
    ))
    .bind(cedula)
    .fetch_optional(pool)
    .await?;
    Ok(empleado)
}

pub async fn create(pool: &SqlitePool, data: EmpleadoCreate) -> RepoResult<Empleado> {
    if data.limite_credito < 0.0 {
        return Err(RepoError::BusinessRule(
            ErrorCode::LimiteCreditoInvalido,
            "limite_credito must not be negative".into(),
        ));
    }
    if find_by_cedula(pool, &data.cedula).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Cédula '{}' already registered",
            data.cedula
        )));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    // A new credit line starts fully available
    sqlx::query(
        "INSERT INTO empleado (id, empresa_id, nombre, cedula, telefono, email, limite_credito, saldo_disponible, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.empresa_id)
    .bind(&data.nombre)
    .bind(&data.cedula)
    .bind(&data.telefono)
    .bind(&data.email)
    .bind(data.limite_credito)
    .bind(data.limite_credito)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create empleado".into()))
}

/// Update an empleado. Changing `limite_credito` shifts `saldo_disponible`
/// by the same delta so the consumed amount is preserved, clamped back into
/// `[0, limite_credito]`.
pub async fn update(pool: &SqlitePool, id: i64, data: EmpleadoUpdate) -> RepoResult<Empleado> {
    if let Some(limite) = data.limite_credito {
        if limite < 0.0 {
            return Err(RepoError::BusinessRule(
                ErrorCode::LimiteCreditoInvalido,
                "limite_credito must not be negative".into(),
            ));
        }
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE empleado SET \
            nombre = COALESCE(?1, nombre), \
            telefono = COALESCE(?2, telefono), \
            email = COALESCE(?3, email), \
            saldo_disponible = CASE WHEN ?4 IS NULL THEN saldo_disponible \
                ELSE MAX(0.0, MIN(?4, saldo_disponible + (?4 - limite_credito))) END, \
            limite_credito = COALESCE(?4, limite_credito), \
            is_active = COALESCE(?5, is_active), \
            updated_at = ?6 \
         WHERE id = ?7",
    )
    .bind(&data.nombre)
    .bind(&data.telefono)
    .bind(&data.email)
    .bind(data.limite_credito)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Empleado {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Empleado {id} not found")))
}

/// Atomically deduct a consumo amount from the available balance. The guard
/// clause rejects the update when the balance would go negative; callers map
/// zero affected rows to a credit error.
pub async fn descontar_credito<'e, E>(executor: E, empleado_id: i64, monto: f64) -> RepoResult<bool>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE empleado SET \
            saldo_disponible = saldo_disponible - ?1, \
            updated_at = ?2 \
         WHERE id = ?3 AND is_active = 1 AND saldo_disponible + ?4 >= ?1",
    )
    .bind(monto)
    .bind(shared::util::now_millis())
    .bind(empleado_id)
    .bind(SALDO_EPSILON)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Restore balance, clamped to the credit limit. Used on reversal and on
/// full payment of a CxC documento.
pub async fn restaurar_credito<'e, E>(executor: E, empleado_id: i64, monto: f64) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "UPDATE empleado SET \
            saldo_disponible = MIN(limite_credito, saldo_disponible + ?1), \
            updated_at = ?2 \
         WHERE id = ?3",
    )
    .bind(monto)
    .bind(shared::util::now_millis())
    .bind(empleado_id)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::testutil;
    use shared::models::EmpleadoUpdate;

    fn sin_cambios() -> EmpleadoUpdate {
        EmpleadoUpdate {
            nombre: None,
            telefono: None,
            email: None,
            limite_credito: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_cedula_rejected() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;

        let err = create(
            svc.pool(),
            EmpleadoCreate {
                empresa_id: fx.empresa_id,
                nombre: "Otro".into(),
                cedula: "001-0000001-1".into(),
                telefono: None,
                email: None,
                limite_credito: 1000.0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_limite_change_shifts_saldo() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;
        // 5000 limit, consume 2000: saldo 3000
        testutil::consumo(svc.pool(), &fx, 2000.0).await;

        // Raise limit to 6000: consumed amount preserved, saldo 4000
        let mut data = sin_cambios();
        data.limite_credito = Some(6000.0);
        let empleado = update(svc.pool(), fx.empleado_id, data).await.unwrap();
        assert_eq!(empleado.saldo_disponible, 4000.0);

        // Lower limit to 1500: shifted saldo would go negative, clamps to 0
        let mut data = sin_cambios();
        data.limite_credito = Some(1500.0);
        let empleado = update(svc.pool(), fx.empleado_id, data).await.unwrap();
        assert_eq!(empleado.limite_credito, 1500.0);
        assert_eq!(empleado.saldo_disponible, 0.0);
    }

    #[tokio::test]
    async fn test_descontar_guard_and_restaurar_clamp() {
        let svc = testutil::service().await;
        let fx = testutil::seed(svc.pool()).await;

        assert!(descontar_credito(svc.pool(), fx.empleado_id, 5000.0)
            .await
            .unwrap());
        // Balance exhausted, next deduction is refused
        assert!(!descontar_credito(svc.pool(), fx.empleado_id, 0.01)
            .await
            .unwrap());

        // Restoration never exceeds the limit
        restaurar_credito(svc.pool(), fx.empleado_id, 9999.0)
            .await
            .unwrap();
        let empleado = find_by_id(svc.pool(), fx.empleado_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(empleado.saldo_disponible, 5000.0);
    }
}
