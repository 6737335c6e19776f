//! The acting user and their role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a user within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular employee.
    #[default]
    Staff,
    /// Team leader; may decide on requests.
    Leader,
    /// Administrator; may decide on and remove any record.
    Admin,
}

impl Role {
    /// Returns true if the role may approve or reject requests.
    pub fn can_decide(&self) -> bool {
        matches!(self, Role::Leader | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Staff => write!(f, "staff"),
            Role::Leader => write!(f, "leader"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "leader" => Ok(Role::Leader),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// The currently authenticated user, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the user.
    pub user_id: String,
    /// The user's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Returns true if the actor is `user_id` or an admin.
    pub fn owns_or_admin(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("leader".parse::<Role>().unwrap(), Role::Leader);
        assert_eq!(" ADMIN ".parse::<Role>().unwrap(), Role::Admin);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_leaders_and_admins_decide() {
        assert!(!Role::Staff.can_decide());
        assert!(Role::Leader.can_decide());
        assert!(Role::Admin.can_decide());
    }

    #[test]
    fn test_owns_or_admin() {
        let staff = Actor::new("user_001", Role::Staff);
        let admin = Actor::new("admin_001", Role::Admin);

        assert!(staff.owns_or_admin("user_001"));
        assert!(!staff.owns_or_admin("user_002"));
        assert!(admin.owns_or_admin("user_002"));
    }
}
