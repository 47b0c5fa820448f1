//! Authentication and authorization
//!
//! - [`JwtService`]: token issue/validation
//! - [`CurrentUser`]: authenticated principal, extracted per request
//! - [`password`]: Argon2id hashing
//! - role capability checks in [`permissions`]

pub mod extractor;
pub mod jwt;
pub mod password;
pub mod permissions;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
