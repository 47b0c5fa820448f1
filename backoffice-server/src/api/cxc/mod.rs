//! CxC API - receivable documents against empresas

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cxc", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/empresas", get(handler::resumen))
        .route("/empresas/{id}/documentos", get(handler::documentos))
        .route("/empresas/{id}/preview-consolidado", get(handler::preview))
        .route("/empresas/{id}/consolidar", post(handler::consolidar))
        .route("/documentos/{id}", get(handler::documento))
        .route("/documentos/{id}/cobros", post(handler::aplicar_cobro))
        .route("/documentos/{id}/anular", post(handler::anular))
        .route("/documentos/{id}/refinanciar", post(handler::refinanciar))
}
