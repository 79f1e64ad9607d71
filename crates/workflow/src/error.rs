//! Workflow errors - the caller-facing taxonomy

use grantflow_core::{Amount, RequestId};
use grantflow_ledger::StoreError;
use thiserror::Error;

/// Errors from workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not permitted for this actor")]
    Authorization,

    #[error("Not found")]
    NotFound,

    #[error(
        "Grant budget exceeded: active total {active} + requested {requested} > {total}"
    )]
    BudgetExceeded {
        active: Amount,
        requested: Amount,
        total: Amount,
    },

    #[error("Request {request} does not permit this operation: {detail}")]
    InvalidState { request: RequestId, detail: String },

    #[error("Approval batches must contain exactly 3 distinct requests, got {0}")]
    InvalidBatchSize(usize),

    #[error("Request {request} blocked: unresolved high-severity compliance flag")]
    ComplianceBlocked { request: RequestId },

    #[error(transparent)]
    Store(StoreError),

    #[error("Flag register error: {0}")]
    Flags(#[from] grantflow_aml::FlagError),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::GrantNotFound(_)
            | StoreError::ItemNotFound(_)
            | StoreError::RequestNotFound(_) => WorkflowError::NotFound,
            StoreError::ItemGrantMismatch { item, grant } => WorkflowError::Validation(
                format!("spending item {} does not belong to grant {}", item, grant),
            ),
            StoreError::ItemCeilingExceeded { requested, ceiling } => {
                WorkflowError::Validation(format!(
                    "request amount {} exceeds item ceiling {}",
                    requested, ceiling
                ))
            }
            StoreError::BudgetExceeded {
                active,
                requested,
                total,
            } => WorkflowError::BudgetExceeded {
                active,
                requested,
                total,
            },
            StoreError::StateConflict {
                request, actual, ..
            } => WorkflowError::InvalidState {
                request,
                detail: format!("status is {}", actual),
            },
            StoreError::ReceiptAlreadyAttached { request } => WorkflowError::InvalidState {
                request,
                detail: "receipt already attached".to_string(),
            },
            other => WorkflowError::Store(other),
        }
    }
}
