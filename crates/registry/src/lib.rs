//! GrantFlow Identity & Role Registry
//!
//! Holds actor identity and exactly one of three mutually exclusive roles.
//! Every other component consults this crate for authorization.
//!
//! Sessions are explicit values with a test-controllable lifecycle: issued
//! at login, resolved per call, invalidated at logout. There is no ambient
//! "current user" state anywhere in the workspace.

mod actor;
mod auth;
mod error;
mod registry;
mod session;
mod store;

pub use actor::Actor;
pub use auth::{authorize, GrantAction, GrantScope};
pub use error::RegistryError;
pub use registry::Registry;
pub use session::Session;
pub use store::RegistryStore;
