//! GrantFlow Grant Ledger
//!
//! Owns the Grant, SpendingItem and SpendingRequest entities and the SQLite
//! store they live in. The store exposes transactional primitives — budget-
//! checked request insertion and compare-and-swap status transitions — that
//! the workflow engine builds on; the `GrantLedger` service covers grant
//! creation, grantee assignment and role-scoped reads.
//!
//! Status transitions are driven exclusively by `grantflow-workflow`; no
//! other component writes `SpendingRequest.status`.

pub mod entities;
pub mod error;
pub mod ledger;
pub mod store;

pub use entities::{Grant, RequestStatus, SpendingItem, SpendingRequest};
pub use error::{LedgerError, StoreError};
pub use ledger::{GrantDetail, GrantLedger};
pub use store::{GrantStore, NewSpendingItem};
