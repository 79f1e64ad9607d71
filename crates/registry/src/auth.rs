//! Authorization - role-based, resource-scoped
//!
//! `authorize` is a pure function over the actor's role and the ownership
//! fields of the grant being acted on. Matching is exhaustive on both the
//! role and the action, so adding a role or an action forces every rule to
//! be revisited at compile time.

use crate::actor::Actor;
use grantflow_core::{ActorId, Role};

/// Actions gated per grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantAction {
    /// Read the grant, its items and its requests
    View,
    /// Assign (or reassign) the grantee
    AssignGrantee,
    /// Bulk-import spending items from a file
    ImportItems,
    /// Create a spending item (budget line)
    CreateItem,
    /// Create a spending request against an item
    CreateRequest,
    /// Approve pending requests (batch)
    ApproveRequest,
    /// Reject a pending request
    RejectRequest,
    /// Attach a receipt to a request or item
    AttachReceipt,
    /// Finalize payment of a receipted request
    FinalizePayment,
}

/// Ownership fields of the grant a given action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantScope {
    pub government_id: ActorId,
    pub university_id: Option<ActorId>,
    pub grantee_id: Option<ActorId>,
}

/// Decide whether `actor` may perform `action` within `scope`.
///
/// A government actor acts only on grants it issued; a university only on
/// grants assigned to it; a grantee only on grants assigned to them.
pub fn authorize(actor: &Actor, action: GrantAction, scope: &GrantScope) -> bool {
    use GrantAction::*;

    match actor.role {
        Role::Government => match action {
            View | ImportItems | FinalizePayment => scope.government_id == actor.id,
            AssignGrantee | CreateItem | CreateRequest | ApproveRequest | RejectRequest
            | AttachReceipt => false,
        },
        Role::University => match action {
            View | AssignGrantee | ApproveRequest | RejectRequest => {
                scope.university_id == Some(actor.id)
            }
            ImportItems | CreateItem | CreateRequest | AttachReceipt | FinalizePayment => false,
        },
        Role::Grantee => match action {
            View | CreateItem | CreateRequest | AttachReceipt => {
                scope.grantee_id == Some(actor.id)
            }
            AssignGrantee | ImportItems | ApproveRequest | RejectRequest | FinalizePayment => {
                false
            }
        },
    }
}
