//! AML flag record and severity scale

use chrono::{DateTime, Utc};
use grantflow_core::{FlagId, RequestId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{Display, EnumString};

/// Flag severity, ordered from lowest to highest.
///
/// Only `High` affects the workflow: it blocks payment of the flagged
/// request. `Low` and `Medium` are informational for reviewers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

/// A compliance flag delivered by the external detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmlFlag {
    pub id: FlagId,
    pub spending_request_id: RequestId,
    pub flag_type: String,
    pub severity: Severity,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert_eq!([Severity::Low, Severity::High].iter().max(), Some(&Severity::High));
    }

    #[test]
    fn severity_string_roundtrip() {
        for severity in [Severity::Low, Severity::Medium, Severity::High] {
            assert_eq!(
                severity.to_string().parse::<Severity>().unwrap(),
                severity
            );
        }
    }
}
