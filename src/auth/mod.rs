//! Authentication Module
//! Mission: Password hashing, bearer tokens, and the authorization rule set

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;

pub use jwt::{JwtHandler, TokenError};
pub use middleware::CurrentUser;
pub use password::PasswordHasher;
pub use policy::{authorize, Action};
