//! Ledger and store errors

use crate::entities::RequestStatus;
use grantflow_core::{Amount, GrantId, ItemId, RequestId};
use thiserror::Error;

/// Errors from the grant store.
///
/// Invariant checks that must be atomic with a write (budget ceiling, item
/// ceiling, status compare-and-swap) surface here because they are decided
/// inside the store's transaction; the workflow engine maps them onto its
/// own taxonomy.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Grant not found: {0}")]
    GrantNotFound(GrantId),

    #[error("Spending item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Spending request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Spending item {item} does not belong to grant {grant}")]
    ItemGrantMismatch { item: ItemId, grant: GrantId },

    #[error("Request amount {requested} exceeds item ceiling {ceiling}")]
    ItemCeilingExceeded { requested: Amount, ceiling: Amount },

    #[error(
        "Grant budget exceeded: active total {active} + requested {requested} > {total}"
    )]
    BudgetExceeded {
        active: Amount,
        requested: Amount,
        total: Amount,
    },

    #[error("Request {request} is {actual}, transition requires {expected}")]
    StateConflict {
        request: RequestId,
        expected: RequestStatus,
        actual: RequestStatus,
    },

    #[error("Request {request} already has a receipt")]
    ReceiptAlreadyAttached { request: RequestId },

    #[error("Grantee cannot be reassigned: grant {0} has spending requests")]
    GranteeLocked(GrantId),

    #[error("Corrupt stored value in column {0}")]
    Corrupt(&'static str),
}

/// Errors from grant ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not permitted for this actor")]
    Authorization,

    #[error("Not found")]
    NotFound,

    #[error("Grantee cannot be reassigned once spending requests exist")]
    ReassignmentLocked,

    #[error(transparent)]
    Store(StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] grantflow_registry::RegistryError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::GrantNotFound(_)
            | StoreError::ItemNotFound(_)
            | StoreError::RequestNotFound(_) => LedgerError::NotFound,
            StoreError::GranteeLocked(_) => LedgerError::ReassignmentLocked,
            other => LedgerError::Store(other),
        }
    }
}
