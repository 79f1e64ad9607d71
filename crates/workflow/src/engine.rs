//! Workflow engine - the single writer of request status

use crate::batch::ApprovalBatch;
use crate::error::WorkflowError;
use grantflow_aml::{AmlFlag, FlagRegister};
use grantflow_core::{Amount, GrantId, ItemId, RequestId, Role};
use grantflow_ledger::{GrantStore, RequestStatus, SpendingRequest};
use grantflow_registry::{authorize, Actor, GrantAction};
use std::sync::Arc;
use tracing::{info, warn};

/// Request workflow engine.
///
/// Every status transition goes through here; the engine checks the
/// caller's role against the grant's ownership fields, then delegates the
/// actual state change to the store's compare-and-swap primitives so that
/// racing callers are serialized and losers surface as invalid-state
/// errors rather than overwrites.
pub struct WorkflowEngine {
    store: Arc<GrantStore>,
    flags: Arc<FlagRegister>,
}

impl WorkflowEngine {
    pub fn new(store: Arc<GrantStore>, flags: Arc<FlagRegister>) -> Self {
        Self { store, flags }
    }

    /// Create a spending request against an item of the grant.
    ///
    /// Grantee only. The item ceiling and the grant budget are enforced in
    /// the same transaction that inserts the request; a request equal to
    /// the remaining budget is allowed.
    pub fn create_request(
        &self,
        actor: &Actor,
        grant_id: GrantId,
        item_id: ItemId,
        amount: Amount,
    ) -> Result<SpendingRequest, WorkflowError> {
        if amount.is_zero() {
            return Err(WorkflowError::Validation(
                "request amount must be positive".into(),
            ));
        }
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::CreateRequest, &grant.scope()) {
            return Err(WorkflowError::Authorization);
        }

        let request = self.store.insert_request(grant_id, item_id, amount)?;
        info!(
            request_id = request.id,
            grant_id,
            amount = %amount,
            "spending request created"
        );
        Ok(request)
    }

    /// Approve a batch of exactly three distinct pending requests.
    ///
    /// Every request must belong to a grant assigned to the calling
    /// university, and every request must still be awaiting approval. The
    /// transition is atomic: all three move to `pending_receipt` or none do.
    pub fn approve_batch(
        &self,
        actor: &Actor,
        request_ids: &[RequestId],
    ) -> Result<Vec<SpendingRequest>, WorkflowError> {
        let batch = ApprovalBatch::new(request_ids)?;

        for &id in batch.ids() {
            let request = self.store.get_request(id)?;
            let grant = self.store.get_grant(request.grant_id)?;
            if !authorize(actor, GrantAction::ApproveRequest, &grant.scope()) {
                return Err(WorkflowError::Authorization);
            }
        }

        let updated = self.store.transition_batch(
            batch.ids(),
            RequestStatus::PendingUniversityApproval,
            RequestStatus::PendingReceipt,
        )?;
        info!(requests = ?batch.ids(), "approval batch committed");
        Ok(updated)
    }

    /// Reject a pending request. Terminal; the amount stops counting
    /// against the grant budget.
    pub fn reject(
        &self,
        actor: &Actor,
        request_id: RequestId,
    ) -> Result<SpendingRequest, WorkflowError> {
        let request = self.store.get_request(request_id)?;
        let grant = self.store.get_grant(request.grant_id)?;
        if !authorize(actor, GrantAction::RejectRequest, &grant.scope()) {
            return Err(WorkflowError::Authorization);
        }

        let rejected = self.store.transition_request(
            request_id,
            RequestStatus::PendingUniversityApproval,
            RequestStatus::Rejected,
        )?;
        info!(request_id, "spending request rejected");
        Ok(rejected)
    }

    /// Attach a receipt to an approved request.
    ///
    /// Permitted only while the request is in `pending_receipt` and has no
    /// receipt yet. Does not change the status; it satisfies the
    /// precondition for `finalize`.
    pub fn attach_receipt(
        &self,
        actor: &Actor,
        request_id: RequestId,
        receipt_url: &str,
    ) -> Result<SpendingRequest, WorkflowError> {
        if receipt_url.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "receipt URL cannot be empty".into(),
            ));
        }
        let request = self.store.get_request(request_id)?;
        let grant = self.store.get_grant(request.grant_id)?;
        if !authorize(actor, GrantAction::AttachReceipt, &grant.scope()) {
            return Err(WorkflowError::Authorization);
        }

        let updated = self
            .store
            .attach_request_receipt(request_id, receipt_url.trim())?;
        info!(request_id, "receipt attached");
        Ok(updated)
    }

    /// Finalize payment of a receipted request.
    ///
    /// Government owner of the grant. Requires an attached receipt; a
    /// high-severity AML flag redirects the request to `blocked` and the
    /// caller is told so instead of receiving a silently dropped payment.
    pub fn finalize(
        &self,
        actor: &Actor,
        request_id: RequestId,
    ) -> Result<SpendingRequest, WorkflowError> {
        let request = self.store.get_request(request_id)?;
        let grant = self.store.get_grant(request.grant_id)?;
        if !authorize(actor, GrantAction::FinalizePayment, &grant.scope()) {
            return Err(WorkflowError::Authorization);
        }

        if request.status != RequestStatus::PendingReceipt {
            return Err(WorkflowError::InvalidState {
                request: request_id,
                detail: format!("status is {}", request.status),
            });
        }
        if request.receipt_url.is_none() {
            return Err(WorkflowError::InvalidState {
                request: request_id,
                detail: "no receipt attached".into(),
            });
        }

        if self.flags.has_high_severity(request_id)? {
            self.store.transition_request(
                request_id,
                RequestStatus::PendingReceipt,
                RequestStatus::Blocked,
            )?;
            warn!(request_id, "payment blocked by high-severity flag");
            return Err(WorkflowError::ComplianceBlocked {
                request: request_id,
            });
        }

        let paid = self.store.transition_request(
            request_id,
            RequestStatus::PendingReceipt,
            RequestStatus::Paid,
        )?;
        info!(request_id, "spending request paid");
        Ok(paid)
    }

    /// Get a request visible to the actor.
    pub fn get_request(
        &self,
        actor: &Actor,
        request_id: RequestId,
    ) -> Result<SpendingRequest, WorkflowError> {
        let request = self.store.get_request(request_id)?;
        let grant = self.store.get_grant(request.grant_id)?;
        if !authorize(actor, GrantAction::View, &grant.scope()) {
            return Err(WorkflowError::NotFound);
        }
        Ok(request)
    }

    /// List every request visible to the actor across their grants.
    pub fn list_requests(&self, actor: &Actor) -> Result<Vec<SpendingRequest>, WorkflowError> {
        let requests = match actor.role {
            Role::Government => self.store.requests_for_government(actor.id)?,
            Role::University => self.store.requests_for_university(actor.id)?,
            Role::Grantee => self.store.requests_for_grantee(actor.id)?,
        };
        Ok(requests)
    }

    /// AML flags for one request, visibility-scoped through its grant.
    pub fn flags_for_request(
        &self,
        actor: &Actor,
        request_id: RequestId,
    ) -> Result<Vec<AmlFlag>, WorkflowError> {
        // Re-uses the request read for the visibility check.
        let request = self.get_request(actor, request_id)?;
        Ok(self.flags.flags_for_request(request.id)?)
    }

    /// AML flags across all requests of a grant.
    pub fn flags_for_grant(
        &self,
        actor: &Actor,
        grant_id: GrantId,
    ) -> Result<Vec<AmlFlag>, WorkflowError> {
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::View, &grant.scope()) {
            return Err(WorkflowError::NotFound);
        }
        let ids: Vec<RequestId> = self
            .store
            .requests_for_grant(grant_id)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        Ok(self.flags.flags_for_requests(&ids)?)
    }
}
