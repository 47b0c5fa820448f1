//! Data models
//!
//! Shared between backoffice-server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (snowflake-style, JS-safe). All timestamps are Unix
//! millis (`i64`); date-only fields travel as `YYYY-MM-DD` strings and are
//! converted at the API boundary. Wire field names are camelCase.

pub mod caja;
pub mod cobro;
pub mod consumo;
pub mod dashboard;
pub mod documento;
pub mod empleado;
pub mod empresa;
pub mod proveedor;
pub mod tienda;
pub mod usuario;

// Re-exports
pub use caja::*;
pub use cobro::*;
pub use consumo::*;
pub use dashboard::*;
pub use documento::*;
pub use empleado::*;
pub use empresa::*;
pub use proveedor::*;
pub use tienda::*;
pub use usuario::*;
