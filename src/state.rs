//! Shared application state handed to every handler.

use crate::auth::{JwtHandler, PasswordHasher};
use crate::config::Config;
use crate::store::Store;
use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub hasher: Arc<PasswordHasher>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AppState {
    pub fn new(store: Arc<Store>, hasher: Arc<PasswordHasher>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            store,
            hasher,
            jwt_handler,
        }
    }

    /// Build every component from the process configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Store::open(&config.database_path)
            .with_context(|| format!("Failed to open database at {}", config.database_path))?;
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let jwt_handler = JwtHandler::new(
            &config.jwt_secret,
            Duration::minutes(config.token_ttl_minutes),
        );

        Ok(Self::new(
            Arc::new(store),
            Arc::new(hasher),
            Arc::new(jwt_handler),
        ))
    }

    /// Hash a password on the blocking pool.
    pub async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("Password hashing task failed")?
    }

    /// Verify against `digest`, or burn a dummy verification when there is none.
    pub async fn verify_password(&self, password: String, digest: Option<String>) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match digest {
            Some(digest) => hasher.verify(&password, &digest),
            None => {
                hasher.verify_dummy(&password);
                false
            }
        })
        .await
        .context("Password verification task failed")
    }
}
