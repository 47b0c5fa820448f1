//! CxP API - payable documents to proveedores

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cxp", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/proveedores", get(handler::resumen))
        .route("/proveedores/{id}/documentos", get(handler::documentos))
        .route("/proveedores/{id}/preview-consolidado", get(handler::preview))
        .route("/proveedores/{id}/consolidar", post(handler::consolidar))
        .route("/documentos/{id}", get(handler::documento))
        .route("/documentos/{id}/pagos", post(handler::aplicar_pago))
        .route("/documentos/{id}/anular", post(handler::anular))
}
