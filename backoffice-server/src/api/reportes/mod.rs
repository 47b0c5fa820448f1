//! Reportes API - aging and period summaries

mod handler;

use axum::{routing::get, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reportes", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/antiguedad", get(handler::antiguedad))
        .route("/consumos", get(handler::consumos))
}
