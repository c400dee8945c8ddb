//! Database Bootstrap
//! Mission: Seed the default roles and the initial admin account
//!
//! Safe to run on every start: existing rows are left untouched.

use crate::auth::{policy::ADMIN_ROLE, PasswordHasher};
use crate::models::{NewUser, Role};
use crate::store::Store;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

pub const DEFAULT_ROLES: [&str; 3] = [ADMIN_ROLE, "editor", "viewer"];
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "adminpassword";

/// What a bootstrap run actually changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: Vec<String>,
    pub admin_created: bool,
}

pub fn seed(store: &Store, hasher: &PasswordHasher, admin_password: &str) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut admin_role: Option<Role> = None;

    for name in DEFAULT_ROLES {
        let role = match store.get_role_by_name(name)? {
            Some(role) => {
                debug!("Role already present: {} (id {})", role.name, role.id);
                role
            }
            None => {
                let role = store
                    .create_role(name)
                    .with_context(|| format!("Failed to create role {name}"))?;
                info!("✅ Created role: {} (id {})", role.name, role.id);
                report.roles_created.push(role.name.clone());
                role
            }
        };

        if name == ADMIN_ROLE {
            admin_role = Some(role);
        }
    }

    let admin_role = admin_role.context("Admin role missing after seeding")?;

    if store.get_user_by_username(ADMIN_USERNAME)?.is_none() {
        if admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("⚠️  Seeding admin with the default password; change it or set ADMIN_PASSWORD");
        }

        let user = store
            .create_user(&NewUser {
                username: ADMIN_USERNAME.to_string(),
                email: ADMIN_EMAIL.to_string(),
                hashed_password: hasher.hash(admin_password)?,
                role_id: admin_role.id,
            })
            .context("Failed to create admin user")?;

        info!("👤 Created admin user: {} (id {})", user.username, user.id);
        report.admin_created = true;
    } else {
        info!("👤 Admin user already present");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_creates_defaults_in_order() {
        let store = Store::in_memory().unwrap();
        let hasher = PasswordHasher::new(4).unwrap();

        let report = seed(&store, &hasher, "adminpassword").unwrap();
        assert_eq!(report.roles_created, vec!["admin", "editor", "viewer"]);
        assert!(report.admin_created);

        let roles = store.list_roles(0, 100).unwrap();
        let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["admin", "editor", "viewer"]);
        // The end-to-end flow relies on editor being id 2.
        assert_eq!(roles[1].id, 2);

        let admin = store.get_user_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.email, "admin@example.com");
        assert_eq!(admin.role_id, roles[0].id);
        assert!(hasher.verify("adminpassword", &admin.hashed_password));
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let hasher = PasswordHasher::new(4).unwrap();

        seed(&store, &hasher, "first-password").unwrap();
        let second = seed(&store, &hasher, "second-password").unwrap();

        assert_eq!(second, SeedReport::default());
        assert_eq!(store.list_roles(0, 100).unwrap().len(), 3);
        assert_eq!(store.list_users(0, 100).unwrap().len(), 1);

        // The existing admin keeps its original password.
        let admin = store.get_user_by_username("admin").unwrap().unwrap();
        assert!(hasher.verify("first-password", &admin.hashed_password));
    }

    #[test]
    fn test_seed_fills_in_missing_roles_only() {
        let store = Store::in_memory().unwrap();
        let hasher = PasswordHasher::new(4).unwrap();
        store.create_role("viewer").unwrap();

        let report = seed(&store, &hasher, "adminpassword").unwrap();
        assert_eq!(report.roles_created, vec!["admin", "editor"]);
        assert_eq!(store.list_roles(0, 100).unwrap().len(), 3);
    }
}
