//! Grant, SpendingItem and SpendingRequest entities

use chrono::{DateTime, Utc};
use grantflow_core::{ActorId, Amount, Currency, GrantId, ItemId, RequestId};
use grantflow_registry::GrantScope;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// A budgeted allocation of funds from a government actor to a university,
/// eventually executed by an assigned grantee.
///
/// `total_amount` is the hard ceiling for the sum of all active (non-
/// rejected, non-blocked) spending requests under the grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub title: String,
    pub description: String,
    pub total_amount: Amount,
    pub currency: Currency,
    pub government_id: ActorId,
    pub university_id: Option<ActorId>,
    pub grantee_id: Option<ActorId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Grant {
    /// Ownership fields for authorization checks.
    pub fn scope(&self) -> GrantScope {
        GrantScope {
            government_id: self.government_id,
            university_id: self.university_id,
            grantee_id: self.grantee_id,
        }
    }
}

/// A budget line the grantee proposes to spend against.
///
/// `amount` is a ceiling: any spending request referencing this item must
/// not exceed it. Items are immutable once created (aside from the receipt
/// URL), so the ceiling can never shrink below a referencing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingItem {
    pub id: ItemId,
    pub grant_id: GrantId,
    pub title: String,
    pub description: String,
    pub amount: Amount,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle states of a spending request.
///
/// `PendingUniversityApproval` is the entry state. `Paid`, `Rejected` and
/// `Blocked` are terminal; nothing transitions out of them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    PendingUniversityApproval,
    PendingReceipt,
    Paid,
    Rejected,
    Blocked,
}

impl RequestStatus {
    /// Whether a request in this state still counts against the grant budget.
    pub fn is_active(&self) -> bool {
        !matches!(self, RequestStatus::Rejected | RequestStatus::Blocked)
    }

    /// Whether any transition out of this state exists.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Paid | RequestStatus::Rejected | RequestStatus::Blocked
        )
    }
}

/// A grantee's claim to spend `amount` against a spending item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingRequest {
    pub id: RequestId,
    pub grant_id: GrantId,
    pub spending_item_id: ItemId,
    pub amount: Amount,
    pub status: RequestStatus,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
