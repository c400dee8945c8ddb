//! Database initializer
//!
//! Creates the schema, the default roles (admin, editor, viewer) and the
//! admin account, then prints what exists. Re-running is harmless.
//!
//! Usage:
//!   init_db --database-path useradmin.db --admin-password <secret>

use anyhow::{Context, Result};
use clap::Parser;
use useradmin_backend::{
    auth::PasswordHasher, bootstrap, config::load_env, init_tracing, store::Store,
};

#[derive(Parser, Debug)]
#[command(name = "init_db")]
#[command(about = "Create the schema and seed default roles plus the admin account")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "useradmin.db")]
    database_path: String,

    /// Password for the admin account (only used when it does not exist yet)
    #[arg(long, env = "ADMIN_PASSWORD", default_value = bootstrap::DEFAULT_ADMIN_PASSWORD, hide_env_values = true)]
    admin_password: String,

    /// bcrypt work factor
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    bcrypt_cost: u32,
}

fn main() -> Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();

    let store = Store::open(&cli.database_path)
        .with_context(|| format!("Failed to open database at {}", cli.database_path))?;
    let hasher = PasswordHasher::new(cli.bcrypt_cost)?;

    let report = bootstrap::seed(&store, &hasher, &cli.admin_password)?;

    println!("Database: {}", cli.database_path);
    if report.roles_created.is_empty() {
        println!("Roles: all defaults already present");
    } else {
        println!("Roles created: {}", report.roles_created.join(", "));
    }
    println!(
        "Admin user: {}",
        if report.admin_created { "created" } else { "already present" }
    );

    println!();
    println!("{:<6} {}", "ID", "ROLE");
    for role in store.list_roles(0, u32::MAX)? {
        println!("{:<6} {}", role.id, role.name);
    }

    Ok(())
}
