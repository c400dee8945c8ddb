//! Domain models and request/response schemas for users and roles.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Named authorization tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// User account as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // bcrypt digest - never serialize
    pub role_id: i64,
}

/// Fields for a new user row. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub role_id: i64,
}

/// Partial user update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub hashed_password: Option<String>,
    pub role_id: Option<i64>,
}

/// Authenticated caller, resolved from the token subject.
///
/// `role_name` is `None` when the user's role cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: i64,
    pub username: String,
    pub role_name: Option<String>,
}

/// User response (sanitized)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role_id: i64,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role_id: user.role_id,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role_id: user.role_id,
        }
    }
}

/// POST /users body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role_id: i64,
}

/// PUT /users/{id} body. Only supplied fields change.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub role_id: Option<i64>,
}

/// POST /roles body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 3, max = 20))]
    pub name: String,
}

/// PUT /roles/{id} body
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 3, max = 20))]
    pub name: Option<String>,
}

/// `skip`/`limit` query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}
