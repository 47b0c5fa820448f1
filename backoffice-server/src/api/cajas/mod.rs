//! Caja API

mod handler;

use axum::{routing::put, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/cajas/{id}", put(handler::update))
}
