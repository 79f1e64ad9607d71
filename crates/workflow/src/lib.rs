//! GrantFlow Request Workflow Engine
//!
//! The state machine owning every `SpendingRequest` status transition:
//!
//! ```text
//! pending_university_approval ──approve (batch of 3)──► pending_receipt ──finalize──► paid
//!            │                                                 │
//!            └──reject──► rejected                             └──high AML flag──► blocked
//! ```
//!
//! `paid`, `rejected` and `blocked` are terminal. Approval is only
//! reachable through a batch of exactly three distinct pending requests,
//! applied atomically. Finalizing requires an attached receipt and a clean
//! AML record; a high-severity flag redirects the transition to `blocked`
//! and reports `ComplianceBlocked` to the caller.

mod batch;
mod engine;
mod error;

pub use batch::{ApprovalBatch, APPROVAL_BATCH_SIZE};
pub use engine::WorkflowEngine;
pub use error::WorkflowError;
