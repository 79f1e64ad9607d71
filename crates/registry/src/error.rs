//! Registry errors

use grantflow_core::ActorId;
use thiserror::Error;

/// Errors from registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("An account already exists for {0}")]
    DuplicateEmail(String),

    /// Covers both unknown email and wrong password so that login attempts
    /// cannot probe which addresses are registered.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session is not active")]
    SessionExpired,

    #[error("Actor not found: {0}")]
    NotFound(ActorId),

    #[error("Email cannot be empty")]
    EmptyEmail,
}
