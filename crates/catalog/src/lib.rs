//! GrantFlow Spending Catalog
//!
//! Budget line items under a grant. A grantee adds items one at a time;
//! the issuing government can bulk-import them from a tabular file with
//! partial-success semantics: rows that fail validation are skipped and
//! counted, never aborting the valid remainder.

mod catalog;
mod error;
mod import;

pub use catalog::{ImportOutcome, SpendingCatalog};
pub use error::CatalogError;
