//! Automatic cut-off scheduler
//!
//! Periodically checks every empresa with `corte_automatico` enabled and,
//! on its `dia_corte`, consolidates all still-unbilled consumos into a CxC
//! documento. The check is idempotent within a day: once a documento has
//! been emitted for the empresa on the current date, later ticks skip it.

use chrono::Datelike;
use shared::error::ErrorCode;

use crate::core::ServerState;
use crate::db::repository::empresa;
use crate::utils::time;

pub fn spawn_corte_scheduler(state: ServerState) {
    let interval = state.config.corte_check_interval_secs;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = interval, "corte scheduler started");
        loop {
            ticker.tick().await;
            if let Err(e) = run_cortes(&state).await {
                tracing::error!(error = %e, "corte scheduler pass failed");
            }
        }
    });
}

/// One scheduler pass over every auto-corte empresa.
pub async fn run_cortes(state: &ServerState) -> crate::utils::AppResult<()> {
    let tz = state.config.timezone;
    let hoy = time::today(tz);
    let empresas = empresa::find_corte_automatico(&state.pool).await?;

    for registro in empresas {
        if hoy.day() != registro.dia_corte as u32 {
            continue;
        }
        if emitido_hoy(state, registro.id).await? {
            continue;
        }

        // Bill everything still unattached, from the oldest pending consumo
        // through today.
        let Some(desde_ms) = primer_pendiente(state, registro.id).await? else {
            continue;
        };
        let desde = time::millis_to_date(desde_ms, tz);

        match state
            .billing
            .consolidar_cxc(registro.id, desde, hoy, None)
            .await
        {
            Ok(doc) => {
                tracing::info!(
                    empresa_id = registro.id,
                    numero = %doc.numero,
                    monto = doc.monto_total,
                    "automatic corte emitted"
                );
            }
            Err(e) if e.code == ErrorCode::NadaQueConsolidar => {
                tracing::debug!(empresa_id = registro.id, "corte skipped, nothing to bill");
            }
            Err(e) => {
                tracing::warn!(empresa_id = registro.id, error = %e, "automatic corte failed");
            }
        }
    }
    Ok(())
}

/// Whether a CxC documento was already emitted for the empresa today.
async fn emitido_hoy(state: &ServerState, empresa_id: i64) -> crate::utils::AppResult<bool> {
    let hoy_inicio = time::day_start_millis(time::today(state.config.timezone), state.config.timezone);
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM documento_cxc WHERE empresa_id = ? AND fecha_emision >= ?",
    )
    .bind(empresa_id)
    .bind(hoy_inicio)
    .fetch_one(&state.pool)
    .await?;
    Ok(count > 0)
}

/// Timestamp of the oldest unbilled, non-reversed consumo, if any.
async fn primer_pendiente(state: &ServerState, empresa_id: i64) -> crate::utils::AppResult<Option<i64>> {
    let min: Option<i64> = sqlx::query_scalar(
        "SELECT MIN(fecha) FROM consumo \
         WHERE empresa_id = ? AND reversado = 0 AND documento_cxc_id IS NULL",
    )
    .bind(empresa_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::testutil;

    #[tokio::test]
    async fn emits_on_dia_corte_and_only_once() {
        let state = crate::core::ServerState::for_tests().await;
        let fx = testutil::seed(&state.pool).await;

        // Align the empresa's dia_corte with today and enable auto corte
        let hoy = time::today(state.config.timezone);
        sqlx::query("UPDATE empresa SET dia_corte = ?, corte_automatico = 1 WHERE id = ?")
            .bind(hoy.day() as i64)
            .bind(fx.empresa_id)
            .execute(&state.pool)
            .await
            .unwrap();
        testutil::consumo(&state.pool, &fx, 1200.0).await;

        run_cortes(&state).await.unwrap();
        let docs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documento_cxc")
            .fetch_one(&state.pool)
            .await
            .unwrap();
        assert_eq!(docs, 1);

        // A second pass on the same day must not emit again
        run_cortes(&state).await.unwrap();
        let docs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documento_cxc")
            .fetch_one(&state.pool)
            .await
            .unwrap();
        assert_eq!(docs, 1);
    }

    #[tokio::test]
    async fn skips_empresas_off_their_dia_corte() {
        let state = crate::core::ServerState::for_tests().await;
        let fx = testutil::seed(&state.pool).await;

        let hoy = time::today(state.config.timezone);
        let otro_dia = if hoy.day() == 1 { 2 } else { 1 };
        sqlx::query("UPDATE empresa SET dia_corte = ?, corte_automatico = 1 WHERE id = ?")
            .bind(otro_dia as i64)
            .bind(fx.empresa_id)
            .execute(&state.pool)
            .await
            .unwrap();
        testutil::consumo(&state.pool, &fx, 500.0).await;

        run_cortes(&state).await.unwrap();
        let docs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documento_cxc")
            .fetch_one(&state.pool)
            .await
            .unwrap();
        assert_eq!(docs, 0);
    }
}
