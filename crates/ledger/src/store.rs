//! SQLite storage for grants, spending items and spending requests
//!
//! One connection behind a mutex serializes every operation, and all
//! multi-step invariant checks (budget ceiling, item ceiling, status
//! compare-and-swap) run inside a single transaction while the lock is
//! held. Amounts are stored as exact decimal strings and summed in Rust;
//! no floating point or SQL numeric coercion is involved.

use crate::entities::{Grant, RequestStatus, SpendingItem, SpendingRequest};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use grantflow_core::{ActorId, Amount, Currency, GrantId, ItemId, RequestId};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

/// Input row for item insertion (single or bulk).
#[derive(Debug, Clone)]
pub struct NewSpendingItem {
    pub title: String,
    pub description: String,
    pub amount: Amount,
}

/// SQLite store for the grant ledger.
pub struct GrantStore {
    conn: Mutex<Connection>,
}

impl GrantStore {
    /// Create a new store with the given database path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS grants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                total_amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                government_id INTEGER NOT NULL,
                university_id INTEGER,
                grantee_id INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS spending_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                grant_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                amount TEXT NOT NULL,
                receipt_url TEXT,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS spending_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                grant_id INTEGER NOT NULL,
                spending_item_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                status TEXT NOT NULL,
                receipt_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_items_grant ON spending_items(grant_id);
            CREATE INDEX IF NOT EXISTS idx_requests_grant ON spending_requests(grant_id);
            CREATE INDEX IF NOT EXISTS idx_requests_status ON spending_requests(status);",
        )?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("grant store lock poisoned")
    }

    // === Grants ===

    /// Insert a new grant issued by `government_id` to `university_id`.
    pub fn insert_grant(
        &self,
        title: &str,
        description: &str,
        total_amount: Amount,
        currency: &Currency,
        government_id: ActorId,
        university_id: ActorId,
    ) -> Result<Grant, StoreError> {
        let conn = self.lock();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO grants
             (title, description, total_amount, currency, government_id, university_id,
              grantee_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?7)",
            params![
                title,
                description,
                total_amount.value().to_string(),
                currency.code(),
                government_id,
                university_id,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Self::grant_by_id(&conn, id)
    }

    /// Get a grant by id
    pub fn get_grant(&self, id: GrantId) -> Result<Grant, StoreError> {
        Self::grant_by_id(&self.lock(), id)
    }

    fn grant_by_id(conn: &Connection, id: GrantId) -> Result<Grant, StoreError> {
        conn.query_row(
            "SELECT id, title, description, total_amount, currency, government_id,
                    university_id, grantee_id, created_at, updated_at
             FROM grants WHERE id = ?1",
            params![id],
            grant_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::GrantNotFound(id),
            other => StoreError::Database(other),
        })
    }

    fn list_grants(&self, where_clause: &str, owner: ActorId) -> Result<Vec<Grant>, StoreError> {
        let conn = self.lock();
        let sql = format!(
            "SELECT id, title, description, total_amount, currency, government_id,
                    university_id, grantee_id, created_at, updated_at
             FROM grants WHERE {} = ?1 ORDER BY id",
            where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let grants = stmt
            .query_map(params![owner], grant_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grants)
    }

    /// Grants issued by a government actor
    pub fn grants_for_government(&self, id: ActorId) -> Result<Vec<Grant>, StoreError> {
        self.list_grants("government_id", id)
    }

    /// Grants assigned to a university
    pub fn grants_for_university(&self, id: ActorId) -> Result<Vec<Grant>, StoreError> {
        self.list_grants("university_id", id)
    }

    /// Grants assigned to a grantee
    pub fn grants_for_grantee(&self, id: ActorId) -> Result<Vec<Grant>, StoreError> {
        self.list_grants("grantee_id", id)
    }

    /// Set (or overwrite) the grantee of a grant.
    ///
    /// Overwriting an existing assignment is refused once any spending
    /// request exists against the grant; the check and the update run in
    /// the same transaction.
    pub fn assign_grantee(
        &self,
        grant_id: GrantId,
        grantee_id: ActorId,
    ) -> Result<Grant, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let grant = Self::grant_by_id(&tx, grant_id)?;
        if grant.grantee_id.is_some() && Self::request_count(&tx, grant_id)? > 0 {
            return Err(StoreError::GranteeLocked(grant_id));
        }

        tx.execute(
            "UPDATE grants SET grantee_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![grantee_id, Utc::now().to_rfc3339(), grant_id],
        )?;
        let updated = Self::grant_by_id(&tx, grant_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn request_count(conn: &Connection, grant_id: GrantId) -> Result<i64, StoreError> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM spending_requests WHERE grant_id = ?1",
            params![grant_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // === Spending items ===

    /// Insert a single spending item under a grant
    pub fn insert_item(
        &self,
        grant_id: GrantId,
        item: &NewSpendingItem,
    ) -> Result<SpendingItem, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        Self::grant_by_id(&tx, grant_id)?;
        let inserted = Self::insert_item_tx(&tx, grant_id, item)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// Insert several spending items under a grant in one transaction.
    pub fn insert_items(
        &self,
        grant_id: GrantId,
        items: &[NewSpendingItem],
    ) -> Result<Vec<SpendingItem>, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        Self::grant_by_id(&tx, grant_id)?;
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            inserted.push(Self::insert_item_tx(&tx, grant_id, item)?);
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn insert_item_tx(
        conn: &Connection,
        grant_id: GrantId,
        item: &NewSpendingItem,
    ) -> Result<SpendingItem, StoreError> {
        conn.execute(
            "INSERT INTO spending_items (grant_id, title, description, amount, receipt_url, created_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            params![
                grant_id,
                item.title,
                item.description,
                item.amount.value().to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Self::item_by_id(conn, conn.last_insert_rowid())
    }

    /// Get a spending item by id
    pub fn get_item(&self, id: ItemId) -> Result<SpendingItem, StoreError> {
        Self::item_by_id(&self.lock(), id)
    }

    fn item_by_id(conn: &Connection, id: ItemId) -> Result<SpendingItem, StoreError> {
        conn.query_row(
            "SELECT id, grant_id, title, description, amount, receipt_url, created_at
             FROM spending_items WHERE id = ?1",
            params![id],
            item_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::ItemNotFound(id),
            other => StoreError::Database(other),
        })
    }

    /// List items under a grant, ordered by id
    pub fn items_for_grant(&self, grant_id: GrantId) -> Result<Vec<SpendingItem>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, grant_id, title, description, amount, receipt_url, created_at
             FROM spending_items WHERE grant_id = ?1 ORDER BY id",
        )?;
        let items = stmt
            .query_map(params![grant_id], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Attach a receipt URL to a spending item
    pub fn set_item_receipt(&self, id: ItemId, url: &str) -> Result<SpendingItem, StoreError> {
        let conn = self.lock();
        let rows = conn.execute(
            "UPDATE spending_items SET receipt_url = ?1 WHERE id = ?2",
            params![url, id],
        )?;
        if rows == 0 {
            return Err(StoreError::ItemNotFound(id));
        }
        Self::item_by_id(&conn, id)
    }

    // === Spending requests ===

    /// Insert a spending request, enforcing the item ceiling and the grant
    /// budget inside the same transaction as the insert.
    ///
    /// The running total counts requests whose status is active (anything
    /// except rejected and blocked). The boundary is inclusive: a request
    /// that exactly exhausts the remaining budget is permitted.
    pub fn insert_request(
        &self,
        grant_id: GrantId,
        item_id: ItemId,
        amount: Amount,
    ) -> Result<SpendingRequest, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let grant = Self::grant_by_id(&tx, grant_id)?;
        let item = Self::item_by_id(&tx, item_id)?;
        if item.grant_id != grant_id {
            return Err(StoreError::ItemGrantMismatch {
                item: item_id,
                grant: grant_id,
            });
        }
        if amount > item.amount {
            return Err(StoreError::ItemCeilingExceeded {
                requested: amount,
                ceiling: item.amount,
            });
        }

        let active = Self::active_total_tx(&tx, grant_id)?;
        let projected = active
            .checked_add(&amount)
            .ok_or(StoreError::Corrupt("amount overflow"))?;
        if projected > grant.total_amount {
            return Err(StoreError::BudgetExceeded {
                active,
                requested: amount,
                total: grant.total_amount,
            });
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO spending_requests
             (grant_id, spending_item_id, amount, status, receipt_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)",
            params![
                grant_id,
                item_id,
                amount.value().to_string(),
                <&'static str>::from(RequestStatus::PendingUniversityApproval),
                now,
            ],
        )?;
        let request = Self::request_by_id(&tx, tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(request)
    }

    /// Sum of active (non-rejected, non-blocked) request amounts on a grant.
    pub fn active_total(&self, grant_id: GrantId) -> Result<Amount, StoreError> {
        Self::active_total_tx(&self.lock(), grant_id)
    }

    fn active_total_tx(conn: &Connection, grant_id: GrantId) -> Result<Amount, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT amount FROM spending_requests
             WHERE grant_id = ?1 AND status NOT IN (?2, ?3)",
        )?;
        let amounts = stmt
            .query_map(
                params![
                    grant_id,
                    <&'static str>::from(RequestStatus::Rejected),
                    <&'static str>::from(RequestStatus::Blocked),
                ],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut total = Amount::ZERO;
        for raw in amounts {
            let value =
                Decimal::from_str(&raw).map_err(|_| StoreError::Corrupt("amount"))?;
            let amount = Amount::new(value).map_err(|_| StoreError::Corrupt("amount"))?;
            total = total
                .checked_add(&amount)
                .ok_or(StoreError::Corrupt("amount overflow"))?;
        }
        Ok(total)
    }

    /// Get a spending request by id
    pub fn get_request(&self, id: RequestId) -> Result<SpendingRequest, StoreError> {
        Self::request_by_id(&self.lock(), id)
    }

    fn request_by_id(conn: &Connection, id: RequestId) -> Result<SpendingRequest, StoreError> {
        conn.query_row(
            "SELECT id, grant_id, spending_item_id, amount, status, receipt_url,
                    created_at, updated_at
             FROM spending_requests WHERE id = ?1",
            params![id],
            request_from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::RequestNotFound(id),
            other => StoreError::Database(other),
        })
    }

    /// List requests under a grant, ordered by id
    pub fn requests_for_grant(
        &self,
        grant_id: GrantId,
    ) -> Result<Vec<SpendingRequest>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, grant_id, spending_item_id, amount, status, receipt_url,
                    created_at, updated_at
             FROM spending_requests WHERE grant_id = ?1 ORDER BY id",
        )?;
        let requests = stmt
            .query_map(params![grant_id], request_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    fn requests_by_grant_owner(
        &self,
        owner_column: &str,
        owner: ActorId,
    ) -> Result<Vec<SpendingRequest>, StoreError> {
        let conn = self.lock();
        let sql = format!(
            "SELECT r.id, r.grant_id, r.spending_item_id, r.amount, r.status, r.receipt_url,
                    r.created_at, r.updated_at
             FROM spending_requests r
             JOIN grants g ON g.id = r.grant_id
             WHERE g.{} = ?1 ORDER BY r.id",
            owner_column
        );
        let mut stmt = conn.prepare(&sql)?;
        let requests = stmt
            .query_map(params![owner], request_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    /// Requests across all grants issued by a government actor
    pub fn requests_for_government(&self, id: ActorId) -> Result<Vec<SpendingRequest>, StoreError> {
        self.requests_by_grant_owner("government_id", id)
    }

    /// Requests across all grants assigned to a university
    pub fn requests_for_university(&self, id: ActorId) -> Result<Vec<SpendingRequest>, StoreError> {
        self.requests_by_grant_owner("university_id", id)
    }

    /// Requests across all grants assigned to a grantee
    pub fn requests_for_grantee(&self, id: ActorId) -> Result<Vec<SpendingRequest>, StoreError> {
        self.requests_by_grant_owner("grantee_id", id)
    }

    /// Compare-and-swap a request's status.
    ///
    /// The UPDATE is keyed on the expected current status; losing a race
    /// updates zero rows and surfaces as `StateConflict` carrying the
    /// request's post-transition status.
    pub fn transition_request(
        &self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<SpendingRequest, StoreError> {
        let conn = self.lock();
        Self::transition_tx(&conn, id, from, to)?;
        Self::request_by_id(&conn, id)
    }

    fn transition_tx(
        conn: &Connection,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<(), StoreError> {
        let rows = conn.execute(
            "UPDATE spending_requests SET status = ?1, updated_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![
                <&'static str>::from(to),
                Utc::now().to_rfc3339(),
                id,
                <&'static str>::from(from),
            ],
        )?;
        if rows == 0 {
            let current = Self::request_by_id(conn, id)?;
            return Err(StoreError::StateConflict {
                request: id,
                expected: from,
                actual: current.status,
            });
        }
        Ok(())
    }

    /// Transition a set of requests in one transaction: either every id
    /// moves `from -> to`, or the transaction rolls back and the first
    /// offender is reported.
    pub fn transition_batch(
        &self,
        ids: &[RequestId],
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<Vec<SpendingRequest>, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        for &id in ids {
            // Error return drops the transaction, rolling back prior updates.
            Self::transition_tx(&tx, id, from, to)?;
        }

        let mut updated = Vec::with_capacity(ids.len());
        for &id in ids {
            updated.push(Self::request_by_id(&tx, id)?);
        }
        tx.commit()?;
        Ok(updated)
    }

    /// Attach a receipt URL to a request.
    ///
    /// Permitted only while the request awaits its receipt and has none
    /// yet; both conditions are part of the UPDATE predicate.
    pub fn attach_request_receipt(
        &self,
        id: RequestId,
        url: &str,
    ) -> Result<SpendingRequest, StoreError> {
        let conn = self.lock();
        let rows = conn.execute(
            "UPDATE spending_requests SET receipt_url = ?1, updated_at = ?2
             WHERE id = ?3 AND status = ?4 AND receipt_url IS NULL",
            params![
                url,
                Utc::now().to_rfc3339(),
                id,
                <&'static str>::from(RequestStatus::PendingReceipt),
            ],
        )?;
        if rows == 0 {
            let current = Self::request_by_id(&conn, id)?;
            if current.status != RequestStatus::PendingReceipt {
                return Err(StoreError::StateConflict {
                    request: id,
                    expected: RequestStatus::PendingReceipt,
                    actual: current.status,
                });
            }
            return Err(StoreError::ReceiptAlreadyAttached { request: id });
        }
        Self::request_by_id(&conn, id)
    }
}

// === Row mapping ===

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_amount(idx: usize, raw: String) -> rusqlite::Result<Amount> {
    let value = Decimal::from_str(&raw).map_err(|e| conversion_error(idx, e))?;
    Amount::new(value).map_err(|e| conversion_error(idx, e))
}

fn parse_currency(idx: usize, raw: String) -> rusqlite::Result<Currency> {
    raw.parse::<Currency>().map_err(|e| conversion_error(idx, e))
}

fn parse_status(idx: usize, raw: String) -> rusqlite::Result<RequestStatus> {
    raw.parse::<RequestStatus>()
        .map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn grant_from_row(row: &Row) -> rusqlite::Result<Grant> {
    Ok(Grant {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        total_amount: parse_amount(3, row.get(3)?)?,
        currency: parse_currency(4, row.get(4)?)?,
        government_id: row.get(5)?,
        university_id: row.get(6)?,
        grantee_id: row.get(7)?,
        created_at: parse_timestamp(8, row.get(8)?)?,
        updated_at: parse_timestamp(9, row.get(9)?)?,
    })
}

fn item_from_row(row: &Row) -> rusqlite::Result<SpendingItem> {
    Ok(SpendingItem {
        id: row.get(0)?,
        grant_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        amount: parse_amount(4, row.get(4)?)?,
        receipt_url: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
    })
}

fn request_from_row(row: &Row) -> rusqlite::Result<SpendingRequest> {
    Ok(SpendingRequest {
        id: row.get(0)?,
        grant_id: row.get(1)?,
        spending_item_id: row.get(2)?,
        amount: parse_amount(3, row.get(3)?)?,
        status: parse_status(4, row.get(4)?)?,
        receipt_url: row.get(5)?,
        created_at: parse_timestamp(6, row.get(6)?)?,
        updated_at: parse_timestamp(7, row.get(7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    fn store_with_grant(total: Decimal) -> (GrantStore, Grant) {
        let store = GrantStore::in_memory().unwrap();
        let grant = store
            .insert_grant(
                "Research programme",
                "Annual research funding",
                amount(total),
                &Currency::Usd,
                1,
                2,
            )
            .unwrap();
        (store, grant)
    }

    fn item(store: &GrantStore, grant: &Grant, ceiling: Decimal) -> SpendingItem {
        store
            .insert_item(
                grant.id,
                &NewSpendingItem {
                    title: "Equipment".to_string(),
                    description: "Lab equipment".to_string(),
                    amount: amount(ceiling),
                },
            )
            .unwrap()
    }

    #[test]
    fn insert_and_fetch_grant() {
        let (store, grant) = store_with_grant(dec!(10000));
        let fetched = store.get_grant(grant.id).unwrap();
        assert_eq!(fetched.total_amount.value(), dec!(10000));
        assert_eq!(fetched.university_id, Some(2));
        assert_eq!(fetched.grantee_id, None);
    }

    #[test]
    fn missing_grant_reports_not_found() {
        let store = GrantStore::in_memory().unwrap();
        assert!(matches!(
            store.get_grant(42),
            Err(StoreError::GrantNotFound(42))
        ));
    }

    #[test]
    fn request_within_budget_and_ceiling_accepted() {
        let (store, grant) = store_with_grant(dec!(10000));
        let item = item(&store, &grant, dec!(4000));

        let request = store.insert_request(grant.id, item.id, amount(dec!(4000))).unwrap();
        assert_eq!(request.status, RequestStatus::PendingUniversityApproval);
        assert_eq!(store.active_total(grant.id).unwrap().value(), dec!(4000));
    }

    #[test]
    fn request_over_item_ceiling_rejected() {
        let (store, grant) = store_with_grant(dec!(10000));
        let item = item(&store, &grant, dec!(4000));

        let result = store.insert_request(grant.id, item.id, amount(dec!(4000.01)));
        assert!(matches!(result, Err(StoreError::ItemCeilingExceeded { .. })));
    }

    #[test]
    fn request_over_remaining_budget_rejected() {
        let (store, grant) = store_with_grant(dec!(10000));
        let first = item(&store, &grant, dec!(4000));
        let second = item(&store, &grant, dec!(7000));

        store.insert_request(grant.id, first.id, amount(dec!(4000))).unwrap();
        let result = store.insert_request(grant.id, second.id, amount(dec!(6001)));
        assert!(matches!(result, Err(StoreError::BudgetExceeded { .. })));

        // Exactly the remaining budget is allowed
        let ok = store.insert_request(grant.id, second.id, amount(dec!(6000)));
        assert!(ok.is_ok());
    }

    #[test]
    fn rejected_requests_release_budget() {
        let (store, grant) = store_with_grant(dec!(5000));
        let item = item(&store, &grant, dec!(5000));

        let request = store.insert_request(grant.id, item.id, amount(dec!(5000))).unwrap();
        assert!(matches!(
            store.insert_request(grant.id, item.id, amount(dec!(1))),
            Err(StoreError::BudgetExceeded { .. })
        ));

        store
            .transition_request(
                request.id,
                RequestStatus::PendingUniversityApproval,
                RequestStatus::Rejected,
            )
            .unwrap();
        assert!(store.insert_request(grant.id, item.id, amount(dec!(5000))).is_ok());
    }

    #[test]
    fn item_from_another_grant_rejected() {
        let (store, grant) = store_with_grant(dec!(10000));
        let other = store
            .insert_grant("Other", "", amount(dec!(500)), &Currency::Usd, 1, 2)
            .unwrap();
        let foreign_item = item(&store, &other, dec!(100));

        let result = store.insert_request(grant.id, foreign_item.id, amount(dec!(100)));
        assert!(matches!(result, Err(StoreError::ItemGrantMismatch { .. })));
    }

    #[test]
    fn cas_transition_reports_lost_race() {
        let (store, grant) = store_with_grant(dec!(1000));
        let item = item(&store, &grant, dec!(1000));
        let request = store.insert_request(grant.id, item.id, amount(dec!(100))).unwrap();

        store
            .transition_request(
                request.id,
                RequestStatus::PendingUniversityApproval,
                RequestStatus::PendingReceipt,
            )
            .unwrap();

        // A second actor attempting the same transition loses and sees the
        // post-transition status.
        let result = store.transition_request(
            request.id,
            RequestStatus::PendingUniversityApproval,
            RequestStatus::PendingReceipt,
        );
        match result {
            Err(StoreError::StateConflict { actual, .. }) => {
                assert_eq!(actual, RequestStatus::PendingReceipt)
            }
            other => panic!("expected StateConflict, got {:?}", other.map(|r| r.status)),
        }
    }

    #[test]
    fn batch_transition_is_all_or_nothing() {
        let (store, grant) = store_with_grant(dec!(10000));
        let item = item(&store, &grant, dec!(10000));

        let a = store.insert_request(grant.id, item.id, amount(dec!(100))).unwrap();
        let b = store.insert_request(grant.id, item.id, amount(dec!(100))).unwrap();
        let c = store.insert_request(grant.id, item.id, amount(dec!(100))).unwrap();

        // Poison one of the three
        store
            .transition_request(
                c.id,
                RequestStatus::PendingUniversityApproval,
                RequestStatus::Rejected,
            )
            .unwrap();

        let result = store.transition_batch(
            &[a.id, b.id, c.id],
            RequestStatus::PendingUniversityApproval,
            RequestStatus::PendingReceipt,
        );
        assert!(matches!(result, Err(StoreError::StateConflict { .. })));

        // Nothing moved
        assert_eq!(
            store.get_request(a.id).unwrap().status,
            RequestStatus::PendingUniversityApproval
        );
        assert_eq!(
            store.get_request(b.id).unwrap().status,
            RequestStatus::PendingUniversityApproval
        );

        // Valid batch goes through
        let d = store.insert_request(grant.id, item.id, amount(dec!(100))).unwrap();
        let updated = store
            .transition_batch(
                &[a.id, b.id, d.id],
                RequestStatus::PendingUniversityApproval,
                RequestStatus::PendingReceipt,
            )
            .unwrap();
        assert!(updated.iter().all(|r| r.status == RequestStatus::PendingReceipt));
    }

    #[test]
    fn receipt_attach_requires_pending_receipt_and_no_receipt() {
        let (store, grant) = store_with_grant(dec!(1000));
        let item = item(&store, &grant, dec!(1000));
        let request = store.insert_request(grant.id, item.id, amount(dec!(100))).unwrap();

        // Still awaiting approval
        assert!(matches!(
            store.attach_request_receipt(request.id, "https://blobs/r1.pdf"),
            Err(StoreError::StateConflict { .. })
        ));

        store
            .transition_request(
                request.id,
                RequestStatus::PendingUniversityApproval,
                RequestStatus::PendingReceipt,
            )
            .unwrap();
        let updated = store
            .attach_request_receipt(request.id, "https://blobs/r1.pdf")
            .unwrap();
        assert_eq!(updated.receipt_url.as_deref(), Some("https://blobs/r1.pdf"));

        assert!(matches!(
            store.attach_request_receipt(request.id, "https://blobs/r2.pdf"),
            Err(StoreError::ReceiptAlreadyAttached { .. })
        ));
    }

    #[test]
    fn grantee_assignment_locked_after_requests_exist() {
        let (store, grant) = store_with_grant(dec!(1000));

        let assigned = store.assign_grantee(grant.id, 3).unwrap();
        assert_eq!(assigned.grantee_id, Some(3));

        // Reassignment with no requests is still allowed
        let reassigned = store.assign_grantee(grant.id, 4).unwrap();
        assert_eq!(reassigned.grantee_id, Some(4));

        let item = item(&store, &grant, dec!(1000));
        store.insert_request(grant.id, item.id, amount(dec!(10))).unwrap();

        assert!(matches!(
            store.assign_grantee(grant.id, 5),
            Err(StoreError::GranteeLocked(_))
        ));
    }
}
