//! Authentication Extractor
//! Mission: Resolve the bearer token on a request into the calling user

use crate::error::AppError;
use crate::models::Requester;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

/// The authenticated caller. Add it to a handler's arguments to require a token.
///
/// Rejections:
/// - no bearer credentials: `NotAuthenticated`
/// - bad signature, expired, malformed, or the subject no longer exists:
///   `InvalidToken`, with the cause logged but never returned
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Requester);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;

        let claims = state.jwt_handler.validate_token(&token).map_err(|reason| {
            debug!(%reason, "Rejected access token");
            AppError::InvalidToken
        })?;

        let requester = state
            .store
            .find_requester(&claims.sub)?
            .ok_or_else(|| {
                debug!(subject = %claims.sub, "Token subject no longer exists");
                AppError::InvalidToken
            })?;

        Ok(CurrentUser(requester))
    }
}

/// Pull the raw token out of `Authorization: Bearer <token>`.
async fn bearer_token(parts: &mut Parts, state: &AppState) -> Result<String, AppError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotAuthenticated)?;

    Ok(bearer.token().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtHandler, PasswordHasher};
    use crate::models::NewUser;
    use crate::store::Store;
    use axum::http::{header, Request};
    use chrono::Duration;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let store = Store::in_memory().unwrap();
        let role = store.create_role("viewer").unwrap();
        store
            .create_user(&NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                hashed_password: "x".to_string(),
                role_id: role.id,
            })
            .unwrap();

        AppState::new(
            Arc::new(store),
            Arc::new(PasswordHasher::new(4).unwrap()),
            Arc::new(JwtHandler::new("test-secret", Duration::minutes(5))),
        )
    }

    async fn extract(state: &AppState, auth: Option<String>) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/api/v1/users/1");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_valid_token_resolves_requester() {
        let state = test_state();
        let token = state.jwt_handler.generate_token("alice").unwrap();

        let CurrentUser(requester) = extract(&state, Some(format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(requester.username, "alice");
        assert_eq!(requester.role_name.as_deref(), Some("viewer"));
    }

    #[tokio::test]
    async fn test_missing_header_is_not_authenticated() {
        let state = test_state();
        let err = extract(&state, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_not_authenticated() {
        let state = test_state();
        let err = extract(&state, Some("Basic YWxpY2U6cHc=".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let state = test_state();
        let err = extract(&state, Some("Bearer not.a.jwt".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn test_foreign_signature_is_invalid() {
        let state = test_state();
        let other = JwtHandler::new("another-secret", Duration::minutes(5));
        let token = other.generate_token("alice").unwrap();

        let err = extract(&state, Some(format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_invalid() {
        let state = test_state();
        let token = state.jwt_handler.generate_token("ghost").unwrap();

        let err = extract(&state, Some(format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
