//! Authentication API Endpoints
//! Mission: Exchange credentials for a bearer token and report who is calling

use crate::auth::middleware::CurrentUser;
use crate::auth::models::{LoginRequest, TokenResponse};
use crate::error::AppError;
use crate::models::UserResponse;
use crate::state::AppState;
use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use tracing::{info, warn};

/// Login endpoint - POST /api/v1/auth/login
///
/// Unknown usernames and wrong passwords produce the same response, and both
/// pay for one bcrypt verification.
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<TokenResponse>, AppError> {
    info!("🔐 Login attempt: {}", payload.username);

    let user = state.store.get_user_by_username(&payload.username)?;
    let digest = user.as_ref().map(|u| u.hashed_password.clone());

    let valid = state.verify_password(payload.password, digest).await?;

    let user = match user {
        Some(user) if valid => user,
        _ => {
            warn!("❌ Failed login attempt: {}", payload.username);
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state.jwt_handler.generate_token(&user.username)?;
    let expires_in = state.jwt_handler.ttl().num_seconds();

    info!("✅ Login successful: {} (id {})", user.username, user.id);

    Ok(Json(TokenResponse::bearer(token, expires_in)))
}

/// Current user endpoint - GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .store
        .get_user(requester.id)?
        .ok_or(AppError::InvalidToken)?;

    Ok(Json(UserResponse::from(user)))
}
