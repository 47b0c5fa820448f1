//! Core module: server configuration, state and lifecycle errors
//!
//! - [`Config`]: environment-driven configuration
//! - [`ServerState`]: shared service handles
//! - [`Server`]: HTTP server lifecycle
//! - [`ServerError`]: fatal lifecycle errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
