//! Authorization Rules
//! Mission: Decide who may perform which user/role operation
//!
//! Pure functions over an already-resolved [`Requester`]. Self-registration
//! (`POST /users`) needs no requester and never reaches this module.

use crate::error::AppError;
use crate::models::Requester;
use tracing::warn;

/// The only privileged role.
pub const ADMIN_ROLE: &str = "admin";

/// Gated operations. User actions carry the target user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRole,
    ListRoles,
    ReadRole,
    UpdateRole,
    DeleteRole,
    ListUsers,
    ReadUser(i64),
    UpdateUser(i64),
    DeleteUser,
}

impl Action {
    fn denial_message(&self) -> &'static str {
        match self {
            Action::CreateRole => "Not authorized to create roles",
            Action::ListRoles => "Not authorized to list roles",
            Action::ReadRole => "Not authorized to view this role",
            Action::UpdateRole => "Not authorized to update roles",
            Action::DeleteRole => "Not authorized to delete roles",
            Action::ListUsers => "Not authorized to list users",
            Action::ReadUser(_) => "Not authorized to view this user",
            Action::UpdateUser(_) => "Not authorized to update this user",
            Action::DeleteUser => "Not authorized to delete users",
        }
    }
}

/// True only when the requester's role resolves to "admin".
///
/// An unresolvable role is never an error here, just not admin.
pub fn is_admin(requester: &Requester) -> bool {
    requester.role_name.as_deref() == Some(ADMIN_ROLE)
}

pub fn permits(requester: &Requester, action: Action) -> bool {
    match action {
        Action::ReadUser(target) | Action::UpdateUser(target) => {
            requester.id == target || is_admin(requester)
        }
        _ => is_admin(requester),
    }
}

/// Gate an operation, turning a denial into `AppError::Forbidden`.
pub fn authorize(requester: &Requester, action: Action) -> Result<(), AppError> {
    if permits(requester, action) {
        return Ok(());
    }

    warn!(
        requester_id = requester.id,
        action = ?action,
        "Authorization denied"
    );
    Err(AppError::Forbidden(action.denial_message()))
}
