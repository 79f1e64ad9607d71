//! SQLite storage for registered actors

use crate::actor::Actor;
use crate::error::RegistryError;
use chrono::Utc;
use grantflow_core::{ActorId, Role};
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;
use std::sync::Mutex;

/// Credential material kept alongside an actor row.
pub(crate) struct StoredCredentials {
    pub digest: String,
    pub salt: String,
}

/// SQLite storage for actors and their credential digests.
///
/// A single connection behind a mutex serializes all registry access.
pub struct RegistryStore {
    conn: Mutex<Connection>,
}

impl RegistryStore {
    /// Create a new store with the given database path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, RegistryError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), RegistryError> {
        let conn = self.conn.lock().expect("registry store lock poisoned");
        conn.execute(
            "CREATE TABLE IF NOT EXISTS actors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                role TEXT NOT NULL,
                password_digest TEXT NOT NULL,
                salt TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert a new actor. Fails with `DuplicateEmail` if the email is taken.
    pub(crate) fn insert_actor(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
        digest: &str,
        salt: &str,
    ) -> Result<Actor, RegistryError> {
        let conn = self.conn.lock().expect("registry store lock poisoned");
        let result = conn.execute(
            "INSERT INTO actors (email, full_name, role, password_digest, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                email,
                full_name,
                role.as_str(),
                digest,
                salt,
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(Actor {
                id: conn.last_insert_rowid(),
                email: email.to_string(),
                full_name: full_name.to_string(),
                role,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(RegistryError::DuplicateEmail(email.to_string()))
            }
            Err(other) => Err(RegistryError::Database(other)),
        }
    }

    /// Look up an actor plus credential material by email.
    pub(crate) fn credentials_for(
        &self,
        email: &str,
    ) -> Result<Option<(Actor, StoredCredentials)>, RegistryError> {
        let conn = self.conn.lock().expect("registry store lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, email, full_name, role, password_digest, salt
             FROM actors WHERE email = ?1",
        )?;

        let row = stmt
            .query_row(params![email], |row| {
                Ok((
                    row.get::<_, ActorId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(RegistryError::Database(other)),
            })?;

        match row {
            None => Ok(None),
            Some((id, email, full_name, role_str, digest, salt)) => {
                let role = parse_role(&role_str)?;
                Ok(Some((
                    Actor {
                        id,
                        email,
                        full_name,
                        role,
                    },
                    StoredCredentials { digest, salt },
                )))
            }
        }
    }

    /// Get an actor by id
    pub fn get(&self, id: ActorId) -> Result<Option<Actor>, RegistryError> {
        let conn = self.conn.lock().expect("registry store lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, email, full_name, role FROM actors WHERE id = ?1",
        )?;

        let row = stmt
            .query_row(params![id], |row| {
                Ok((
                    row.get::<_, ActorId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(RegistryError::Database(other)),
            })?;

        match row {
            None => Ok(None),
            Some((id, email, full_name, role_str)) => Ok(Some(Actor {
                id,
                email,
                full_name,
                role: parse_role(&role_str)?,
            })),
        }
    }

    /// List all actors with a given role, ordered by id
    pub fn list_by_role(&self, role: Role) -> Result<Vec<Actor>, RegistryError> {
        let conn = self.conn.lock().expect("registry store lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, email, full_name, role FROM actors WHERE role = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![role.as_str()], |row| {
                Ok((
                    row.get::<_, ActorId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, email, full_name, role_str)| {
                Ok(Actor {
                    id,
                    email,
                    full_name,
                    role: parse_role(&role_str)?,
                })
            })
            .collect()
    }
}

fn parse_role(s: &str) -> Result<Role, RegistryError> {
    s.parse::<Role>().map_err(|_| {
        RegistryError::Database(rusqlite::Error::InvalidColumnType(
            3,
            "role".to_string(),
            rusqlite::types::Type::Text,
        ))
    })
}
