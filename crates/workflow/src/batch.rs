//! Approval batch selection
//!
//! Universities approve pending requests three at a time; a lone approval
//! has no path through the engine. Duplicated ids do not count as
//! distinct.

use crate::error::WorkflowError;
use grantflow_core::RequestId;

/// Number of distinct requests a valid approval batch carries.
pub const APPROVAL_BATCH_SIZE: usize = 3;

/// A validated selection of exactly three distinct request ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalBatch {
    ids: Vec<RequestId>,
}

impl ApprovalBatch {
    /// Validate a caller-supplied selection, de-duplicating first.
    pub fn new(ids: &[RequestId]) -> Result<Self, WorkflowError> {
        let mut distinct: Vec<RequestId> = Vec::with_capacity(APPROVAL_BATCH_SIZE);
        for &id in ids {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        if distinct.len() != APPROVAL_BATCH_SIZE {
            return Err(WorkflowError::InvalidBatchSize(distinct.len()));
        }
        Ok(Self { ids: distinct })
    }

    pub fn ids(&self) -> &[RequestId] {
        &self.ids
    }
}
