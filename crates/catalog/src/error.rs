//! Catalog errors

use grantflow_ledger::StoreError;
use thiserror::Error;

/// Errors from catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not permitted for this actor")]
    Authorization,

    #[error("Not found")]
    NotFound,

    #[error("Import file unreadable: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::GrantNotFound(_) | StoreError::ItemNotFound(_) => CatalogError::NotFound,
            other => CatalogError::Store(other),
        }
    }
}
