//! Actor - a registered identity with a fixed role

use grantflow_core::{ActorId, Role};
use serde::{Deserialize, Serialize};

/// A registered actor.
///
/// The email is unique across the registry and the role never changes
/// after registration. Credential material is stored separately and never
/// leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}
