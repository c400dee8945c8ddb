//! HTTP surface: every route, its handler, and the shared layers.

use crate::api::{roles, users};
use crate::auth::api as auth_api;
use crate::middleware::request_logging;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const API_PREFIX: &str = "/api/v1";

/// Build the full application router.
///
/// Collection routes answer with and without a trailing slash. Authentication
/// is enforced per handler by the `CurrentUser` extractor, which lets public
/// `POST /users` share a path with admin-only `GET /users`.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth_api::login))
        .route("/auth/me", get(auth_api::me));

    let user_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    let role_routes = Router::new()
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route("/roles/", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/:id",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        );

    let api = Router::new()
        .merge(auth_routes)
        .merge(user_routes)
        .merge(role_routes);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest(API_PREFIX, api)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the User Management API" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
