//! Role Endpoints
//! Mission: Admin-only management of authorization tiers

use crate::api::extract::ValidatedJson;
use crate::auth::{authorize, Action, CurrentUser};
use crate::error::AppError;
use crate::models::{CreateRoleRequest, Pagination, Role, UpdateRoleRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::info;

pub async fn create_role(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateRoleRequest>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    authorize(&requester, Action::CreateRole)?;

    let role = state.store.create_role(&payload.name)?;
    info!("✅ Created role: {} (id {})", role.name, role.id);

    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn list_roles(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, AppError>,
) -> Result<Json<Vec<Role>>, AppError> {
    authorize(&requester, Action::ListRoles)?;

    Ok(Json(state.store.list_roles(page.skip, page.limit)?))
}

pub async fn get_role(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(role_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Role>, AppError> {
    authorize(&requester, Action::ReadRole)?;

    state
        .store
        .get_role(role_id)?
        .map(Json)
        .ok_or(AppError::RoleNotFound)
}

pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(role_id), _): WithRejection<Path<i64>, AppError>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<Role>, AppError> {
    authorize(&requester, Action::UpdateRole)?;

    let role = state.store.update_role(role_id, payload.name.as_deref())?;
    info!("✏️  Updated role {} -> {}", role.id, role.name);

    Ok(Json(role))
}

/// Fails with `RoleInUse` while any user still references the role.
pub async fn delete_role(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(role_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    authorize(&requester, Action::DeleteRole)?;

    state.store.delete_role(role_id)?;
    info!("🗑️  Deleted role {} by {}", role_id, requester.username);

    Ok(StatusCode::NO_CONTENT)
}
