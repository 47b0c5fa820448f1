//! JWT token service

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::models::{Rol, Usuario};
use thiserror::Error;

/// JWT settings
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | JWT_SECRET | generated (dev) | Signing key, at least 32 chars |
/// | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
/// | JWT_ISSUER | backoffice-server | iss claim |
/// | JWT_AUDIENCE | backoffice-clients | aud claim |
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                tracing::warn!("JWT_SECRET shorter than 32 chars, generating a session key");
                generate_secret()
            }
            Err(_) => {
                // Sessions will not survive a restart without a configured key
                tracing::warn!("JWT_SECRET not set, generating a session key");
                generate_secret()
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "backoffice-server".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "backoffice-clients".into()),
        }
    }
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Claims carried in the token. The role and the scope ids travel with the
/// token so per-request authorization needs no database round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Usuario id
    pub sub: String,
    pub username: String,
    pub rol: Rol,
    pub empresa_id: Option<i64>,
    pub caja_id: Option<i64>,
    pub empleado_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT issue/validation service
#[derive(Debug, Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for an authenticated usuario
    pub fn generate_token(&self, usuario: &Usuario) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: usuario.id.to_string(),
            username: usuario.username.clone(),
            rol: usuario.rol,
            empresa_id: usuario.empresa_id,
            caja_id: usuario.caja_id,
            empleado_id: usuario.empleado_id,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(token_data.claims)
    }

    /// Extract the bearer token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// Authenticated principal, reconstructed from the token claims
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub rol: Rol,
    pub empresa_id: Option<i64>,
    pub caja_id: Option<i64>,
    pub empleado_id: Option<i64>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| format!("non-numeric sub claim: {}", claims.sub))?;
        Ok(Self {
            id,
            username: claims.username,
            rol: claims.rol,
            empresa_id: claims.empresa_id,
            caja_id: claims.caja_id,
            empleado_id: claims.empleado_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(rol: Rol) -> Usuario {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "username": "maria",
            "nombre": "María Gómez",
            "hash_pass": "x",
            "rol": match rol { Rol::Admin => "ADMIN", Rol::Backoffice => "BACKOFFICE", Rol::Empleador => "EMPLEADOR", Rol::Cajero => "CAJERO", Rol::Empleado => "EMPLEADO" },
            "empresa_id": 12,
            "caja_id": null,
            "empleado_id": null,
            "is_active": true,
            "created_at": 0,
            "updated_at": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let service = JwtService::new(JwtConfig::default());
        let token = service.generate_token(&usuario(Rol::Empleador)).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.rol, Rol::Empleador);
        assert_eq!(claims.empresa_id, Some(12));

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "maria");
    }

    #[test]
    fn test_wrong_key_rejected() {
        let issuer = JwtService::new(JwtConfig {
            secret: "a".repeat(64),
            ..JwtConfig::default()
        });
        let verifier = JwtService::new(JwtConfig {
            secret: "b".repeat(64),
            ..JwtConfig::default()
        });
        let token = issuer.generate_token(&usuario(Rol::Admin)).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }
}
