//! Usuario Model (back-office principal)

use serde::{Deserialize, Serialize};

/// Role of a back-office principal.
///
/// One dashboard/API surface parameterized over the role capability set
/// replaces per-role duplicated views: Admin and Backoffice see the whole
/// platform, Empleador is scoped to its empresa, Cajero to its caja, and
/// Empleado to its own credit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Rol {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "BACKOFFICE")]
    Backoffice,
    #[serde(rename = "EMPLEADOR")]
    Empleador,
    #[serde(rename = "CAJERO")]
    Cajero,
    #[serde(rename = "EMPLEADO")]
    Empleado,
}

impl Rol {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrador",
            Self::Backoffice => "Backoffice",
            Self::Empleador => "Empleador",
            Self::Cajero => "Cajero",
            Self::Empleado => "Empleado",
        }
    }
}

/// Usuario row (includes the password hash; never serialized to clients -
/// use [`UsuarioView`] on the wire)
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    pub nombre: String,
    pub hash_pass: String,
    pub rol: Rol,
    /// Scope for Empleador users
    pub empresa_id: Option<i64>,
    /// Scope for Cajero users
    pub caja_id: Option<i64>,
    /// Scope for Empleado users
    pub empleado_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Usuario wire representation (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioView {
    pub id: i64,
    pub username: String,
    pub nombre: String,
    pub rol: Rol,
    pub empresa_id: Option<i64>,
    pub caja_id: Option<i64>,
    pub empleado_id: Option<i64>,
    pub is_active: bool,
}

impl From<Usuario> for UsuarioView {
    fn from(u: Usuario) -> Self {
        Self {
            id: u.id,
            username: u.username,
            nombre: u.nombre,
            rol: u.rol,
            empresa_id: u.empresa_id,
            caja_id: u.caja_id,
            empleado_id: u.empleado_id,
            is_active: u.is_active,
        }
    }
}

/// Create usuario payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioCreate {
    pub username: String,
    pub password: String,
    pub nombre: String,
    pub rol: Rol,
    pub empresa_id: Option<i64>,
    pub caja_id: Option<i64>,
    pub empleado_id: Option<i64>,
}

/// Update usuario payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioUpdate {
    pub password: Option<String>,
    pub nombre: Option<String>,
    pub rol: Option<Rol>,
    pub empresa_id: Option<i64>,
    pub caja_id: Option<i64>,
    pub empleado_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login result: bearer token plus the authenticated principal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub usuario: UsuarioView,
}
