//! Usuario handlers

use axum::extract::{Path, State};
use axum::Json;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{UsuarioCreate, UsuarioUpdate, UsuarioView};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::usuario;
use crate::utils::AppResult;

/// GET /api/usuarios - list principals
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<UsuarioView>>>> {
    user.require_admin()?;
    let usuarios = usuario::find_all(&state.pool).await?;
    Ok(Json(ApiResponse::success(
        usuarios.into_iter().map(UsuarioView::from).collect(),
    )))
}

/// GET /api/usuarios/{id} - principal detail
pub async fn get(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UsuarioView>>> {
    user.require_admin()?;
    let registro = usuario::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UsuarioNotFound))?;
    Ok(Json(ApiResponse::success(registro.into())))
}

/// POST /api/usuarios - create a principal
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UsuarioCreate>,
) -> AppResult<Json<ApiResponse<UsuarioView>>> {
    user.require_admin()?;
    let registro = usuario::create(&state.pool, payload).await?;
    tracing::info!(usuario_id = registro.id, username = %registro.username, "usuario created");
    Ok(Json(ApiResponse::success(registro.into())))
}

/// PUT /api/usuarios/{id} - partial update, optional password rotation
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UsuarioUpdate>,
) -> AppResult<Json<ApiResponse<UsuarioView>>> {
    user.require_admin()?;
    let registro = usuario::update(&state.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(registro.into())))
}

/// DELETE /api/usuarios/{id} - a principal cannot delete its own account
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    user.require_admin()?;
    if user.id == id {
        return Err(AppError::new(ErrorCode::UsuarioCannotDeleteSelf));
    }
    usuario::delete(&state.pool, id).await?;
    tracing::info!(usuario_id = id, deleted_by = user.id, "usuario deleted");
    Ok(Json(ApiResponse::ok()))
}
