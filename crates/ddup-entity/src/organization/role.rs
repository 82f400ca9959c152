//! Organization role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a user can hold inside one organization.
///
/// Ordered by privilege level: Admin > Member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "org_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    /// Regular member.
    Member,
    /// Can manage the organization and its membership.
    Admin,
}

impl OrgRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 2,
            Self::Member => 1,
        }
    }

    /// Check if this role has at least the privileges of `required`.
    pub fn has_at_least(&self, required: OrgRole) -> bool {
        self.privilege_level() >= required.privilege_level()
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrgRole {
    type Err = ddup_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(ddup_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: admin, member"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_outranks_member() {
        assert!(OrgRole::Admin.has_at_least(OrgRole::Member));
        assert!(OrgRole::Admin.has_at_least(OrgRole::Admin));
        assert!(!OrgRole::Member.has_at_least(OrgRole::Admin));
    }

    #[test]
    fn test_parse_role() {
        assert_eq!("ADMIN".parse::<OrgRole>().expect("parse"), OrgRole::Admin);
        assert!("owner".parse::<OrgRole>().is_err());
    }
}
