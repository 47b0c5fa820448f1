//! Proveedor API - merchant catalog and its tienda chain

mod handler;

use axum::{routing::get, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/proveedores", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get).put(handler::update))
        .route("/{id}/tiendas", get(handler::tiendas).post(handler::create_tienda))
}
