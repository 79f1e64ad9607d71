//! Grant ledger operations - create, assign, role-scoped reads

use crate::entities::{Grant, SpendingItem, SpendingRequest};
use crate::error::LedgerError;
use crate::store::GrantStore;
use grantflow_core::{ActorId, Amount, Currency, GrantId, Role};
use grantflow_registry::{authorize, Actor, GrantAction, Registry};
use std::sync::Arc;
use tracing::info;

/// A grant together with its items and requests (the detail view).
#[derive(Debug, Clone)]
pub struct GrantDetail {
    pub grant: Grant,
    pub spending_items: Vec<SpendingItem>,
    pub spending_requests: Vec<SpendingRequest>,
}

/// Grant ledger service.
///
/// Owns grant creation and assignment; every read is scoped by the
/// caller's role. Ids outside the caller's visibility read as absent.
pub struct GrantLedger {
    store: Arc<GrantStore>,
    registry: Arc<Registry>,
}

impl GrantLedger {
    pub fn new(store: Arc<GrantStore>, registry: Arc<Registry>) -> Self {
        Self { store, registry }
    }

    /// Create a grant issued to an existing university.
    ///
    /// Government only. The amount must be strictly positive and the
    /// university id must name a university-role actor.
    pub fn create_grant(
        &self,
        actor: &Actor,
        title: &str,
        description: &str,
        total_amount: Amount,
        currency: &Currency,
        university_id: ActorId,
    ) -> Result<Grant, LedgerError> {
        if actor.role != Role::Government {
            return Err(LedgerError::Authorization);
        }
        if title.trim().is_empty() {
            return Err(LedgerError::Validation("title cannot be empty".into()));
        }
        if total_amount.is_zero() {
            return Err(LedgerError::Validation(
                "total amount must be positive".into(),
            ));
        }
        self.registry
            .require_actor(university_id, Role::University)
            .map_err(|_| {
                LedgerError::Validation(format!("university {} does not exist", university_id))
            })?;

        let grant = self.store.insert_grant(
            title.trim(),
            description,
            total_amount,
            currency,
            actor.id,
            university_id,
        )?;
        info!(grant_id = grant.id, university_id, "grant created");
        Ok(grant)
    }

    /// Assign (or reassign) the grantee of a grant.
    ///
    /// Only the grant's assigned university may do this, and only while no
    /// spending requests exist against the grant once a grantee was set.
    pub fn assign_grantee(
        &self,
        actor: &Actor,
        grant_id: GrantId,
        grantee_id: ActorId,
    ) -> Result<Grant, LedgerError> {
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::AssignGrantee, &grant.scope()) {
            return Err(LedgerError::Authorization);
        }
        self.registry
            .require_actor(grantee_id, Role::Grantee)
            .map_err(|_| LedgerError::NotFound)?;

        let updated = self.store.assign_grantee(grant_id, grantee_id)?;
        info!(grant_id, grantee_id, "grantee assigned");
        Ok(updated)
    }

    /// Get a grant visible to the actor.
    pub fn get_grant(&self, actor: &Actor, grant_id: GrantId) -> Result<Grant, LedgerError> {
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::View, &grant.scope()) {
            // Hide existence of grants outside the caller's scope.
            return Err(LedgerError::NotFound);
        }
        Ok(grant)
    }

    /// Get a grant with its items and requests.
    pub fn grant_detail(&self, actor: &Actor, grant_id: GrantId) -> Result<GrantDetail, LedgerError> {
        let grant = self.get_grant(actor, grant_id)?;
        let spending_items = self.store.items_for_grant(grant_id)?;
        let spending_requests = self.store.requests_for_grant(grant_id)?;
        Ok(GrantDetail {
            grant,
            spending_items,
            spending_requests,
        })
    }

    /// List the grants visible to the actor, scoped by role.
    pub fn list_grants(&self, actor: &Actor) -> Result<Vec<Grant>, LedgerError> {
        let grants = match actor.role {
            Role::Government => self.store.grants_for_government(actor.id)?,
            Role::University => self.store.grants_for_university(actor.id)?,
            Role::Grantee => self.store.grants_for_grantee(actor.id)?,
        };
        Ok(grants)
    }

    /// Remaining budget of a grant visible to the actor.
    pub fn remaining_budget(&self, actor: &Actor, grant_id: GrantId) -> Result<Amount, LedgerError> {
        let grant = self.get_grant(actor, grant_id)?;
        let active = self.store.active_total(grant_id)?;
        Ok(grant
            .total_amount
            .checked_sub(&active)
            .unwrap_or(Amount::ZERO))
    }
}
