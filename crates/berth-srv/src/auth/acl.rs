//! Access control: roles and the permission check.
//!
//! The policy is deliberately minimal. The contract is: fail closed on
//! missing inputs, succeed unconditionally for administrators.

use super::user::User;
use crate::error::{Result, SrvError};

/// Role name that satisfies every permission.
pub const ADMINISTRATOR_ROLE: &str = "administrator";

/// An opaque permission name (e.g. `results:write`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission(pub String);

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named set of permissions.
#[derive(Debug, Clone)]
pub struct Role {
    /// Role name.
    pub name: String,
    /// Human description.
    pub description: String,
    /// Permissions the role grants.
    pub permissions: Vec<Permission>,
}

/// Regulates access to the aggregation API.
#[derive(Debug, Clone, Copy, Default)]
pub struct AclService;

impl AclService {
    /// Create an access control service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Whether `user` may exercise `permission`.
    ///
    /// # Errors
    ///
    /// Missing user or empty permission is itself an error; users without
    /// the administrator role are rejected.
    pub fn check_permission(
        &self,
        user: Option<&User>,
        permission: Option<&Permission>,
    ) -> Result<()> {
        let Some(user) = user else {
            return Err(SrvError::Forbidden("no user supplied".into()));
        };
        let has_permission = permission.is_some_and(|p| !p.0.is_empty());
        if !has_permission {
            return Err(SrvError::Forbidden(
                "a valid permission to check against is required".into(),
            ));
        }
        if user.has_role(ADMINISTRATOR_ROLE) {
            // Admins can do anything.
            return Ok(());
        }
        Err(SrvError::Forbidden(format!(
            "user {} is not authorized",
            user.name
        )))
    }
}
