//! Auth handlers

use axum::{extract::State, Json};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{LoginRequest, LoginResponse, UsuarioView};

use crate::auth::password::verify_password;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::usuario;
use crate::utils::AppResult;

/// POST /api/auth/login
///
/// Credential failures and unknown usernames return the same error; the
/// response never says which part was wrong.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let registro = usuario::find_by_username(&state.pool, &payload.username).await?;

    let Some(registro) = registro else {
        return Err(AppError::invalid_credentials());
    };
    if !verify_password(&payload.password, &registro.hash_pass) {
        tracing::warn!(username = %payload.username, "failed login attempt");
        return Err(AppError::invalid_credentials());
    }
    if !registro.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let token = state
        .get_jwt_service()
        .generate_token(&registro)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(username = %registro.username, "login");
    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        usuario: registro.into(),
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<UsuarioView>>> {
    let registro = usuario::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UsuarioNotFound))?;
    Ok(Json(ApiResponse::success(registro.into())))
}
