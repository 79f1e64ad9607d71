//! Sessions - explicit login state
//!
//! A session is a value handed to the caller at login and passed back with
//! every subsequent call. Logout removes it; nothing in the workspace
//! holds a "current user" implicitly.

use crate::actor::Actor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live session issued by [`crate::Registry::authenticate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub actor: Actor,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn issue(actor: Actor) -> Self {
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            actor,
            issued_at: Utc::now(),
        }
    }
}
