//! Integer identifier aliases, one namespace per entity type.
//!
//! Identifiers are globally unique within their entity type and allocated
//! by the backing store (SQLite rowid). Aliases keep signatures readable
//! without the ceremony of full newtypes.

/// Registered actor (government, university or grantee)
pub type ActorId = i64;

/// Grant
pub type GrantId = i64;

/// Spending item (budget line)
pub type ItemId = i64;

/// Spending request
pub type RequestId = i64;

/// AML flag
pub type FlagId = i64;

/// Contract log entry
pub type LogId = i64;
