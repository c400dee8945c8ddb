//! Process configuration
//!
//! Parsed once at startup from flags and environment (a `.env` file is
//! loaded first), then passed by reference to whatever needs it.

use clap::{ArgAction, Parser};
use dotenv::dotenv;
use std::path::Path;

/// Secret used when `JWT_SECRET` is unset. Fine for local runs only.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Parser, Debug, Clone)]
#[command(name = "useradmin")]
#[command(about = "User and role administration API")]
pub struct Config {
    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "useradmin.db")]
    pub database_path: String,

    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind_addr: String,

    /// HMAC secret for signing access tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = 30)]
    pub token_ttl_minutes: i64,

    /// bcrypt work factor (4-31)
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Seed default roles and the admin account at startup
    #[arg(long, env = "BOOTSTRAP", default_value_t = true, action = ArgAction::Set)]
    pub bootstrap: bool,

    /// Password given to the seeded admin account
    #[arg(long, env = "ADMIN_PASSWORD", default_value = crate::bootstrap::DEFAULT_ADMIN_PASSWORD, hide_env_values = true)]
    pub admin_password: String,
}

impl Config {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Load `.env` from the working directory (and parents), then from the crate root.
pub fn load_env() {
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "useradmin",
            "--database-path",
            "/tmp/test.db",
            "--jwt-secret",
            "s3cret",
            "--token-ttl-minutes",
            "5",
            "--bcrypt-cost",
            "4",
            "--bootstrap",
            "false",
        ])
        .unwrap();

        assert_eq!(config.database_path, "/tmp/test.db");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl_minutes, 5);
        assert_eq!(config.bcrypt_cost, 4);
        assert!(!config.bootstrap);
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn test_rejects_non_numeric_ttl() {
        let result = Config::try_parse_from(["useradmin", "--token-ttl-minutes", "soon"]);
        assert!(result.is_err());
    }
}
