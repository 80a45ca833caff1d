//! User roles.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mutually exclusive user categories controlling route visibility.
///
/// A profile carries exactly one role at a time. The set of legal values is
/// closed: anything else read from storage is a data error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Individual renter (farmer, contractor, homeowner)
    Customer,
    /// Enterprise renting heavy industrial machinery
    Organization,
    /// Equipment vendor listing machinery and bidding on projects
    Provider,
    /// Platform administrator, may view every protected module
    Admin,
}

/// Returned when a string does not name one of the four roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0:?}")]
pub struct InvalidRole(pub String);

impl Role {
    /// All role variants for iteration.
    pub const ALL: [Role; 4] = [
        Role::Customer,
        Role::Organization,
        Role::Provider,
        Role::Admin,
    ];

    /// Role assigned to a profile created on first sign-in.
    pub const DEFAULT: Role = Role::Customer;

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Organization => "organization",
            Self::Provider => "provider",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    /// Parse a role. Matching is exact: stored values are lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "organization" => Ok(Self::Organization),
            "provider" => Ok(Self::Provider),
            "admin" => Ok(Self::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
