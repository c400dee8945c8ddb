//! Application error type and its HTTP mapping.
//!
//! Every handler returns `Result<_, AppError>`; this is the only place a
//! failure becomes a status code. Response body:
//! `{"kind": "<machine kind>", "detail": "<human text>"}`.

use crate::store::StoreError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Username already registered")]
    UsernameConflict,
    #[error("Email already registered")]
    EmailConflict,
    #[error("Role name already exists")]
    RoleNameConflict,
    #[error("Cannot delete role assigned to users")]
    RoleInUse,
    #[error("User not found")]
    UserNotFound,
    #[error("Role not found")]
    RoleNotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UsernameConflict
            | AppError::EmailConflict
            | AppError::RoleNameConflict
            | AppError::RoleInUse => StatusCode::BAD_REQUEST,
            AppError::UserNotFound | AppError::RoleNotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotAuthenticated | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::UsernameConflict
            | AppError::EmailConflict
            | AppError::RoleNameConflict
            | AppError::RoleInUse => "conflict",
            AppError::UserNotFound | AppError::RoleNotFound => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotAuthenticated | AppError::InvalidToken | AppError::InvalidCredentials => {
                "unauthenticated"
            }
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "Request failed with internal error");
        }

        let status = self.status();
        let body = Json(ErrorBody {
            kind: self.kind(),
            detail: self.to_string(),
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UsernameTaken => AppError::UsernameConflict,
            StoreError::EmailTaken => AppError::EmailConflict,
            StoreError::RoleNameTaken => AppError::RoleNameConflict,
            StoreError::RoleInUse => AppError::RoleInUse,
            StoreError::UserNotFound => AppError::UserNotFound,
            StoreError::RoleNotFound => AppError::RoleNotFound,
            StoreError::Sqlite(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::UsernameConflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::RoleInUse.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::RoleNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden("no").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("db gone")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_errors_map_to_domain_errors() {
        assert!(matches!(
            AppError::from(StoreError::RoleInUse),
            AppError::RoleInUse
        ));
        assert!(matches!(
            AppError::from(StoreError::EmailTaken),
            AppError::EmailConflict
        ));
        assert!(matches!(
            AppError::from(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows)),
            AppError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_carries_challenge() {
        let response = AppError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let json = body_json(response).await;
        assert_eq!(json["kind"], "unauthenticated");
        assert_eq!(json["detail"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            AppError::Internal(anyhow::anyhow!("disk I/O error at /var/db")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["kind"], "internal_error");
        assert_eq!(json["detail"], "Internal server error");
    }

    #[tokio::test]
    async fn test_conflict_body() {
        let json = body_json(AppError::RoleInUse.into_response()).await;
        assert_eq!(json["kind"], "conflict");
        assert_eq!(json["detail"], "Cannot delete role assigned to users");
    }
}
