//! User Endpoints
//! Mission: Self-registration plus self-or-admin gated user management

use crate::api::extract::ValidatedJson;
use crate::auth::{authorize, Action, CurrentUser};
use crate::error::AppError;
use crate::models::{
    CreateUserRequest, NewUser, Pagination, UpdateUserRequest, UserChanges, UserResponse,
};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::info;

/// POST /api/v1/users - open to anyone
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let hashed_password = state.hash_password(payload.password).await?;

    let user = state.store.create_user(&NewUser {
        username: payload.username,
        email: payload.email,
        hashed_password,
        role_id: payload.role_id,
    })?;

    info!("✅ Created user: {} (id {}, role {})", user.username, user.id, user.role_id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/v1/users?skip=&limit= - admin only
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, AppError>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    authorize(&requester, Action::ListUsers)?;

    let users = state.store.list_users(page.skip, page.limit)?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/:id - self or admin
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&requester, Action::ReadUser(user_id))?;

    let user = state
        .store
        .get_user(user_id)?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /api/v1/users/:id - self or admin, partial update
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    authorize(&requester, Action::UpdateUser(user_id))?;

    let hashed_password = match payload.password {
        Some(password) => Some(state.hash_password(password).await?),
        None => None,
    };

    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        hashed_password,
        role_id: payload.role_id,
    };

    let user = state.store.update_user(user_id, &changes)?;

    info!("✏️  Updated user {} by {}", user.id, requester.username);

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/v1/users/:id - admin only
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    authorize(&requester, Action::DeleteUser)?;

    state.store.delete_user(user_id)?;

    info!("🗑️  Deleted user {} by {}", user_id, requester.username);

    Ok(StatusCode::NO_CONTENT)
}
