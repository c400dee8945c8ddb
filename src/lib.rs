//! User Admin Backend Library
//!
//! Exposes every module so the server binary, the `init_db` tool and the
//! integration tests share one implementation.

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;

pub use api::create_router;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "useradmin_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
