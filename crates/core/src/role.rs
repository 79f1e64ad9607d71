//! Role - The three actor roles of the disbursement process
//!
//! A role is assigned once at registration and never changes. Every
//! authorization decision matches exhaustively on this enum; roles are
//! never compared as ad-hoc strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a stored role string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Actor role, mutually exclusive and immutable after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Funding authority: issues grants and finalizes payments
    Government,
    /// Intermediary institution: assigns grantees, approves requests
    University,
    /// Fund recipient: proposes spending and attaches receipts
    Grantee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Government => "government",
            Role::University => "university",
            Role::Grantee => "grantee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "government" => Ok(Role::Government),
            "university" => Ok(Role::University),
            "grantee" => Ok(Role::Grantee),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_roundtrip() {
        for role in [Role::Government, Role::University, Role::Grantee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!("auditor".parse::<Role>().is_err());
    }

    #[test]
    fn serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::University).unwrap(),
            "\"university\""
        );
    }
}
