//! Credential Store
//! Mission: Persist users and roles in SQLite and enforce their invariants
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE roles (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL UNIQUE
//! );
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     username TEXT NOT NULL UNIQUE,
//!     email TEXT NOT NULL UNIQUE,
//!     hashed_password TEXT NOT NULL,
//!     role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE RESTRICT
//! );
//! ```
//!
//! Every mutation runs in one transaction on the single guarded connection.
//! The explicit checks produce the domain error; the table constraints are the
//! authoritative guard and their violations map back to the same errors.

use crate::models::{NewUser, Requester, Role, User, UserChanges};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const USER_COLUMNS: &str = "id, username, email, hashed_password, role_id";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already registered")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("role name already exists")]
    RoleNameTaken,
    #[error("role not found")]
    RoleNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("role is assigned to users")]
    RoleInUse,
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User and role storage with SQLite backend
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file and initialize the schema
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL,
                role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE RESTRICT
            );

            CREATE INDEX IF NOT EXISTS idx_users_role_id ON users(role_id);
            "#,
        )?;

        debug!("Credential store schema ready");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ---------------------------------------------------------------------
    // Roles
    // ---------------------------------------------------------------------

    pub fn create_role(&self, name: &str) -> StoreResult<Role> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if role_name_taken(&tx, name, None)? {
            return Err(StoreError::RoleNameTaken);
        }

        tx.execute("INSERT INTO roles (name) VALUES (?1)", params![name])
            .map_err(map_role_write_error)?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(role_id = id, name, "✅ Created role");

        Ok(Role {
            id,
            name: name.to_string(),
        })
    }

    pub fn get_role(&self, id: i64) -> StoreResult<Option<Role>> {
        let conn = self.conn.lock();
        Ok(find_role(&conn, id)?)
    }

    pub fn get_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let conn = self.conn.lock();
        let role = conn
            .query_row(
                "SELECT id, name FROM roles WHERE name = ?1",
                params![name],
                role_from_row,
            )
            .optional()?;
        Ok(role)
    }

    pub fn list_roles(&self, skip: u32, limit: u32) -> StoreResult<Vec<Role>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT id, name FROM roles ORDER BY id LIMIT ?1 OFFSET ?2")?;
        let roles = stmt
            .query_map(params![limit, skip], role_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(roles)
    }

    /// Rename a role. `None` leaves it unchanged.
    pub fn update_role(&self, id: i64, name: Option<&str>) -> StoreResult<Role> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut role = find_role(&tx, id)?.ok_or(StoreError::RoleNotFound)?;

        if let Some(name) = name {
            if role_name_taken(&tx, name, Some(id))? {
                return Err(StoreError::RoleNameTaken);
            }
            tx.execute(
                "UPDATE roles SET name = ?1 WHERE id = ?2",
                params![name, id],
            )
            .map_err(map_role_write_error)?;
            role.name = name.to_string();
        }

        tx.commit()?;
        Ok(role)
    }

    /// Delete a role nobody references.
    pub fn delete_role(&self, id: i64) -> StoreResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if find_role(&tx, id)?.is_none() {
            return Err(StoreError::RoleNotFound);
        }

        let in_use: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role_id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if in_use {
            return Err(StoreError::RoleInUse);
        }

        tx.execute("DELETE FROM roles WHERE id = ?1", params![id])
            .map_err(|e| match constraint_message(&e) {
                Some(msg) if msg.contains("FOREIGN KEY") => StoreError::RoleInUse,
                _ => StoreError::Sqlite(e),
            })?;
        tx.commit()?;

        info!(role_id = id, "🗑️  Deleted role");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    /// Insert a user. Checked in order: username, email, role.
    pub fn create_user(&self, new_user: &NewUser) -> StoreResult<User> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if username_taken(&tx, &new_user.username, None)? {
            return Err(StoreError::UsernameTaken);
        }
        if email_taken(&tx, &new_user.email, None)? {
            return Err(StoreError::EmailTaken);
        }
        if find_role(&tx, new_user.role_id)?.is_none() {
            return Err(StoreError::RoleNotFound);
        }

        tx.execute(
            "INSERT INTO users (username, email, hashed_password, role_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                new_user.username,
                new_user.email,
                new_user.hashed_password,
                new_user.role_id,
            ],
        )
        .map_err(map_user_write_error)?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            user_id = id,
            username = %new_user.username,
            role_id = new_user.role_id,
            "✅ Created user"
        );

        Ok(User {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            hashed_password: new_user.hashed_password.clone(),
            role_id: new_user.role_id,
        })
    }

    pub fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let conn = self.conn.lock();
        Ok(find_user(&conn, id)?)
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// List users (admin only)
    pub fn list_users(&self, skip: u32, limit: u32) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let users = stmt
            .query_map(params![limit, skip], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Apply a partial update.
    ///
    /// Uniqueness is checked only for supplied fields and ignores the row's
    /// own current values, so repeating an update is a no-op.
    pub fn update_user(&self, id: i64, changes: &UserChanges) -> StoreResult<User> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let mut user = find_user(&tx, id)?.ok_or(StoreError::UserNotFound)?;

        if let Some(username) = &changes.username {
            if username_taken(&tx, username, Some(id))? {
                return Err(StoreError::UsernameTaken);
            }
            user.username = username.clone();
        }
        if let Some(email) = &changes.email {
            if email_taken(&tx, email, Some(id))? {
                return Err(StoreError::EmailTaken);
            }
            user.email = email.clone();
        }
        if let Some(hashed_password) = &changes.hashed_password {
            user.hashed_password = hashed_password.clone();
        }
        if let Some(role_id) = changes.role_id {
            if find_role(&tx, role_id)?.is_none() {
                return Err(StoreError::RoleNotFound);
            }
            user.role_id = role_id;
        }

        tx.execute(
            "UPDATE users SET username = ?1, email = ?2, hashed_password = ?3, role_id = ?4
             WHERE id = ?5",
            params![
                user.username,
                user.email,
                user.hashed_password,
                user.role_id,
                id
            ],
        )
        .map_err(map_user_write_error)?;
        tx.commit()?;

        debug!(user_id = id, "Updated user");
        Ok(user)
    }

    /// Delete a user by ID (admin only)
    pub fn delete_user(&self, id: i64) -> StoreResult<()> {
        let conn = self.conn.lock();
        let rows_affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(StoreError::UserNotFound);
        }

        info!(user_id = id, "🗑️  Deleted user");
        Ok(())
    }

    /// Resolve a token subject to a requester, with the role name if the
    /// role still exists.
    pub fn find_requester(&self, username: &str) -> StoreResult<Option<Requester>> {
        let conn = self.conn.lock();
        let requester = conn
            .query_row(
                "SELECT u.id, u.username, r.name
                 FROM users u LEFT JOIN roles r ON r.id = u.role_id
                 WHERE u.username = ?1",
                params![username],
                |row| {
                    Ok(Requester {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        role_name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(requester)
    }
}

fn role_from_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        hashed_password: row.get(3)?,
        role_id: row.get(4)?,
    })
}

fn find_role(conn: &Connection, id: i64) -> rusqlite::Result<Option<Role>> {
    conn.query_row(
        "SELECT id, name FROM roles WHERE id = ?1",
        params![id],
        role_from_row,
    )
    .optional()
}

fn find_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()
}

// `exclude_id` skips the row being updated; ids are never negative.
fn username_taken(conn: &Connection, username: &str, exclude_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 AND id != ?2)",
        params![username, exclude_id.unwrap_or(-1)],
        |row| row.get(0),
    )
}

fn email_taken(conn: &Connection, email: &str, exclude_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND id != ?2)",
        params![email, exclude_id.unwrap_or(-1)],
        |row| row.get(0),
    )
}

fn role_name_taken(conn: &Connection, name: &str, exclude_id: Option<i64>) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM roles WHERE name = ?1 AND id != ?2)",
        params![name, exclude_id.unwrap_or(-1)],
        |row| row.get(0),
    )
}

/// SQLite message for a constraint violation, e.g.
/// `UNIQUE constraint failed: users.email` or `FOREIGN KEY constraint failed`.
fn constraint_message(e: &rusqlite::Error) -> Option<&str> {
    match e {
        rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
            Some(msg.as_deref().unwrap_or(""))
        }
        _ => None,
    }
}

fn map_user_write_error(e: rusqlite::Error) -> StoreError {
    match constraint_message(&e) {
        Some(msg) if msg.contains("users.username") => StoreError::UsernameTaken,
        Some(msg) if msg.contains("users.email") => StoreError::EmailTaken,
        Some(msg) if msg.contains("FOREIGN KEY") => StoreError::RoleNotFound,
        _ => StoreError::Sqlite(e),
    }
}

fn map_role_write_error(e: rusqlite::Error) -> StoreError {
    match constraint_message(&e) {
        Some(msg) if msg.contains("roles.name") => StoreError::RoleNameTaken,
        _ => StoreError::Sqlite(e),
    }
}
