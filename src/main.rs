//! User Admin - user and role administration API
//! Mission: Password login, bearer tokens, and role-gated CRUD over users and roles

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use useradmin_backend::{
    bootstrap, config::load_env, create_router, init_tracing, AppState, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();

    info!("🚀 Starting User Admin API");

    if config.uses_dev_secret() {
        warn!("⚠️  JWT_SECRET not set, using the development secret. Do not run this in production.");
    }

    let state = AppState::from_config(&config)?;
    info!("💾 Database ready at {}", config.database_path);

    if config.bootstrap {
        let report = bootstrap::seed(&state.store, &state.hasher, &config.admin_password)
            .context("Bootstrap failed")?;
        info!(
            roles_created = report.roles_created.len(),
            admin_created = report.admin_created,
            "🌱 Bootstrap complete"
        );
    }

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
