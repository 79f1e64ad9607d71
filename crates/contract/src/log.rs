//! Contract log record

use chrono::{DateTime, Utc};
use grantflow_core::{GrantId, LogId};
use serde::{Deserialize, Serialize};

/// One event observed on the external ledger, immutable once mirrored.
///
/// `data` carries the event payload as the indexer emitted it; a
/// `grant_id` key inside it correlates the event to a grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractLog {
    pub id: LogId,
    pub transaction_hash: String,
    pub event_type: String,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl ContractLog {
    /// Grant this event correlates to, if the payload names one.
    pub fn grant_id(&self) -> Option<GrantId> {
        self.data.get("grant_id").and_then(|v| v.as_i64())
    }
}
