//! Tienda API - store updates and caja chain

mod handler;

use axum::{
    routing::{get, put},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tiendas", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}", put(handler::update))
        .route("/{id}/cajas", get(handler::cajas).post(handler::create_caja))
}
