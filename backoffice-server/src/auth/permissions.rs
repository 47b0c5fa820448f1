//! Role capability checks
//!
//! One surface parameterized over the rol: Admin and Backoffice operate the
//! whole platform, Empleador sees its empresa, Cajero registers consumos at
//! its caja, Empleado reads its own credit line.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Rol;

use crate::auth::CurrentUser;
use crate::billing::reportes::DashboardScope;

fn permiso_denegado() -> AppError {
    AppError::forbidden("No tiene permiso para realizar esta acción")
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.rol == Rol::Admin
    }

    /// Platform operators: Admin and Backoffice
    pub fn is_backoffice(&self) -> bool {
        matches!(self.rol, Rol::Admin | Rol::Backoffice)
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::new(ErrorCode::AdminRequired))
        }
    }

    pub fn require_backoffice(&self) -> AppResult<()> {
        if self.is_backoffice() {
            Ok(())
        } else {
            Err(permiso_denegado())
        }
    }

    /// Backoffice, or an Empleador scoped to this empresa
    pub fn require_empresa_access(&self, empresa_id: i64) -> AppResult<()> {
        if self.is_backoffice() {
            return Ok(());
        }
        if self.rol == Rol::Empleador && self.empresa_id == Some(empresa_id) {
            return Ok(());
        }
        Err(permiso_denegado())
    }

    /// Backoffice, or a Cajero registering at its own caja
    pub fn require_caja_access(&self, caja_id: i64) -> AppResult<()> {
        if self.is_backoffice() {
            return Ok(());
        }
        if self.rol == Rol::Cajero && self.caja_id == Some(caja_id) {
            return Ok(());
        }
        Err(permiso_denegado())
    }

    /// Dashboard visibility for this principal. A scoped rol without its
    /// scope id is a provisioning error and gets no data.
    pub fn dashboard_scope(&self) -> AppResult<DashboardScope> {
        match self.rol {
            Rol::Admin | Rol::Backoffice => Ok(DashboardScope::Global),
            Rol::Empleador => self
                .empresa_id
                .map(DashboardScope::Empresa)
                .ok_or_else(permiso_denegado),
            Rol::Cajero => self
                .caja_id
                .map(DashboardScope::Caja)
                .ok_or_else(permiso_denegado),
            Rol::Empleado => self
                .empleado_id
                .map(DashboardScope::Empleado)
                .ok_or_else(permiso_denegado),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(rol: Rol, empresa_id: Option<i64>, caja_id: Option<i64>) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "test".into(),
            rol,
            empresa_id,
            caja_id,
            empleado_id: None,
        }
    }

    #[test]
    fn test_backoffice_capabilities() {
        let admin = user(Rol::Admin, None, None);
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_empresa_access(99).is_ok());

        let backoffice = user(Rol::Backoffice, None, None);
        assert!(backoffice.require_admin().is_err());
        assert!(backoffice.require_backoffice().is_ok());
        assert!(backoffice.require_caja_access(5).is_ok());
    }

    #[test]
    fn test_empleador_scoped_to_own_empresa() {
        let empleador = user(Rol::Empleador, Some(10), None);
        assert!(empleador.require_empresa_access(10).is_ok());
        assert!(empleador.require_empresa_access(11).is_err());
        assert!(empleador.require_backoffice().is_err());
        assert_eq!(
            empleador.dashboard_scope().unwrap(),
            crate::billing::reportes::DashboardScope::Empresa(10)
        );
    }

    #[test]
    fn test_cajero_scoped_to_own_caja() {
        let cajero = user(Rol::Cajero, None, Some(3));
        assert!(cajero.require_caja_access(3).is_ok());
        assert!(cajero.require_caja_access(4).is_err());
        assert!(cajero.require_empresa_access(1).is_err());
    }

    #[test]
    fn test_scoped_rol_without_scope_id_denied() {
        let empleador = user(Rol::Empleador, None, None);
        assert!(empleador.dashboard_scope().is_err());
    }
}
