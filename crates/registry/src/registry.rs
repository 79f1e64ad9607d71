//! Registry service - registration, authentication, session lifecycle

use crate::actor::Actor;
use crate::error::RegistryError;
use crate::session::Session;
use crate::store::RegistryStore;
use grantflow_core::{ActorId, Role};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Identity & role registry.
///
/// Wraps the actor store and tracks live sessions. Passwords are stored as
/// salted SHA-256 digests; the plaintext never leaves `register` and
/// `authenticate`.
pub struct Registry {
    store: RegistryStore,
    sessions: Mutex<HashMap<String, Session>>,
}

impl Registry {
    pub fn new(store: RegistryStore) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new actor with the given role.
    ///
    /// Exactly one actor may exist per email.
    pub fn register(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
        password: &str,
    ) -> Result<Actor, RegistryError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(RegistryError::EmptyEmail);
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let digest = credential_digest(&salt, password);

        let actor = self
            .store
            .insert_actor(&email, full_name, role, &digest, &salt)?;
        info!(actor_id = actor.id, role = %actor.role, "actor registered");
        Ok(actor)
    }

    /// Authenticate by email and password, issuing a fresh session.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, RegistryError> {
        let email = email.trim().to_lowercase();
        let (actor, creds) = self
            .store
            .credentials_for(&email)?
            .ok_or(RegistryError::InvalidCredentials)?;

        if credential_digest(&creds.salt, password) != creds.digest {
            return Err(RegistryError::InvalidCredentials);
        }

        let session = Session::issue(actor);
        self.sessions
            .lock()
            .expect("session table lock poisoned")
            .insert(session.token.clone(), session.clone());
        debug!(actor_id = session.actor.id, "session issued");
        Ok(session)
    }

    /// Resolve a live session token to its actor.
    pub fn actor_for_token(&self, token: &str) -> Result<Actor, RegistryError> {
        self.sessions
            .lock()
            .expect("session table lock poisoned")
            .get(token)
            .map(|s| s.actor.clone())
            .ok_or(RegistryError::SessionExpired)
    }

    /// Invalidate a session. Returns true if it was live.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .expect("session table lock poisoned")
            .remove(token)
            .is_some()
    }

    /// Get an actor by id
    pub fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, RegistryError> {
        self.store.get(id)
    }

    /// Get an actor by id, requiring a specific role.
    ///
    /// Used when an operation names a counterparty, e.g. the university a
    /// grant is issued to or the grantee being assigned.
    pub fn require_actor(&self, id: ActorId, role: Role) -> Result<Actor, RegistryError> {
        match self.store.get(id)? {
            Some(actor) if actor.role == role => Ok(actor),
            _ => Err(RegistryError::NotFound(id)),
        }
    }

    /// List all actors with a given role (the university / grantee pickers)
    pub fn list_by_role(&self, role: Role) -> Result<Vec<Actor>, RegistryError> {
        self.store.list_by_role(role)
    }
}

fn credential_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::new(RegistryStore::in_memory().unwrap())
    }

    #[test]
    fn register_then_authenticate() {
        let registry = registry();
        let actor = registry
            .register("gov@fund.example", "Ministry", Role::Government, "hunter2")
            .unwrap();

        let session = registry.authenticate("gov@fund.example", "hunter2").unwrap();
        assert_eq!(session.actor.id, actor.id);

        let resolved = registry.actor_for_token(&session.token).unwrap();
        assert_eq!(resolved.id, actor.id);
    }

    #[test]
    fn wrong_password_and_unknown_email_look_identical() {
        let registry = registry();
        registry
            .register("uni@fund.example", "Uni", Role::University, "secret")
            .unwrap();

        let wrong = registry.authenticate("uni@fund.example", "nope");
        let unknown = registry.authenticate("ghost@fund.example", "nope");
        assert!(matches!(wrong, Err(RegistryError::InvalidCredentials)));
        assert!(matches!(unknown, Err(RegistryError::InvalidCredentials)));
    }

    #[test]
    fn logout_invalidates_session() {
        let registry = registry();
        registry
            .register("lab@fund.example", "Lab", Role::Grantee, "pw")
            .unwrap();
        let session = registry.authenticate("lab@fund.example", "pw").unwrap();

        assert!(registry.logout(&session.token));
        assert!(matches!(
            registry.actor_for_token(&session.token),
            Err(RegistryError::SessionExpired)
        ));
        // Second logout is a no-op
        assert!(!registry.logout(&session.token));
    }

    #[test]
    fn email_is_case_insensitive() {
        let registry = registry();
        registry
            .register("Lab@Fund.Example", "Lab", Role::Grantee, "pw")
            .unwrap();
        assert!(registry.authenticate("lab@fund.example", "pw").is_ok());

        let dup = registry.register("LAB@fund.example", "Lab2", Role::Grantee, "pw");
        assert!(matches!(dup, Err(RegistryError::DuplicateEmail(_))));
    }

    #[test]
    fn require_actor_checks_role() {
        let registry = registry();
        let uni = registry
            .register("uni@fund.example", "Uni", Role::University, "pw")
            .unwrap();

        assert!(registry.require_actor(uni.id, Role::University).is_ok());
        assert!(matches!(
            registry.require_actor(uni.id, Role::Grantee),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.require_actor(999, Role::University),
            Err(RegistryError::NotFound(_))
        ));
    }
}
