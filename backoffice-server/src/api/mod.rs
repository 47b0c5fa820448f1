//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`auth`] - login and current principal
//! - [`dashboard`] - role-aware KPI aggregate
//! - [`empresas`], [`proveedores`], [`tiendas`], [`cajas`], [`empleados`],
//!   [`usuarios`] - catalog CRUD
//! - [`consumos`] - consumption registration, listing, reversal
//! - [`cxc`], [`cxp`] - billing documents, payments, lifecycle
//! - [`reportes`] - aging and period summaries
//!
//! Every response uses the `ApiResponse<T>` envelope; paged listings wrap
//! their page in `PaginatedResponse<T>`.

pub mod auth;
pub mod health;

pub mod cajas;
pub mod empleados;
pub mod empresas;
pub mod proveedores;
pub mod tiendas;
pub mod usuarios;

pub mod consumos;
pub mod cxc;
pub mod cxp;
pub mod dashboard;
pub mod reportes;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(empresas::router())
        .merge(proveedores::router())
        .merge(tiendas::router())
        .merge(cajas::router())
        .merge(empleados::router())
        .merge(usuarios::router())
        .merge(consumos::router())
        .merge(cxc::router())
        .merge(cxp::router())
        .merge(reportes::router())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
