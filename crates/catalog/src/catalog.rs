//! Spending catalog operations

use crate::error::CatalogError;
use crate::import::parse_rows;
use grantflow_core::{Amount, GrantId, ItemId};
use grantflow_ledger::{GrantStore, NewSpendingItem, SpendingItem};
use grantflow_registry::{authorize, Actor, GrantAction};
use std::sync::Arc;
use tracing::info;

/// Result of a bulk import: how many rows became items, how many were
/// skipped, and the created items themselves.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub created: usize,
    pub skipped: usize,
    pub items: Vec<SpendingItem>,
}

/// Spending catalog service.
pub struct SpendingCatalog {
    store: Arc<GrantStore>,
}

impl SpendingCatalog {
    pub fn new(store: Arc<GrantStore>) -> Self {
        Self { store }
    }

    /// Add a single budget line. Grantee of the grant only.
    pub fn add_item(
        &self,
        actor: &Actor,
        grant_id: GrantId,
        title: &str,
        description: &str,
        amount: Amount,
    ) -> Result<SpendingItem, CatalogError> {
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::CreateItem, &grant.scope()) {
            return Err(CatalogError::Authorization);
        }
        if title.trim().is_empty() {
            return Err(CatalogError::Validation("title cannot be empty".into()));
        }
        if amount.is_zero() {
            return Err(CatalogError::Validation("amount must be positive".into()));
        }

        let item = self.store.insert_item(
            grant_id,
            &NewSpendingItem {
                title: title.trim().to_string(),
                description: description.to_string(),
                amount,
            },
        )?;
        info!(item_id = item.id, grant_id, "spending item added");
        Ok(item)
    }

    /// Bulk-import budget lines from a CSV file. Government owner only.
    ///
    /// Partial success: invalid rows are skipped and counted. A file that
    /// yields zero valid rows fails the whole call.
    pub fn bulk_import(
        &self,
        actor: &Actor,
        grant_id: GrantId,
        data: &[u8],
    ) -> Result<ImportOutcome, CatalogError> {
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::ImportItems, &grant.scope()) {
            return Err(CatalogError::Authorization);
        }

        let parsed = parse_rows(data)?;
        if parsed.items.is_empty() {
            return Err(CatalogError::Validation(
                "import file contains no valid rows".into(),
            ));
        }

        let items = self.store.insert_items(grant_id, &parsed.items)?;
        info!(
            grant_id,
            created = items.len(),
            skipped = parsed.skipped,
            "spending items imported"
        );
        Ok(ImportOutcome {
            created: items.len(),
            skipped: parsed.skipped,
            items,
        })
    }

    /// Attach a receipt URL to an item. Grantee of the grant only.
    pub fn attach_item_receipt(
        &self,
        actor: &Actor,
        item_id: ItemId,
        receipt_url: &str,
    ) -> Result<SpendingItem, CatalogError> {
        if receipt_url.trim().is_empty() {
            return Err(CatalogError::Validation("receipt URL cannot be empty".into()));
        }
        let item = self.store.get_item(item_id)?;
        let grant = self.store.get_grant(item.grant_id)?;
        if !authorize(actor, GrantAction::AttachReceipt, &grant.scope()) {
            return Err(CatalogError::Authorization);
        }
        Ok(self.store.set_item_receipt(item_id, receipt_url.trim())?)
    }

    /// List a grant's items, scoped to actors who can view the grant.
    pub fn list_items(
        &self,
        actor: &Actor,
        grant_id: GrantId,
    ) -> Result<Vec<SpendingItem>, CatalogError> {
        let grant = self.store.get_grant(grant_id)?;
        if !authorize(actor, GrantAction::View, &grant.scope()) {
            return Err(CatalogError::NotFound);
        }
        Ok(self.store.items_for_grant(grant_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantflow_core::{Currency, Role};
    use grantflow_registry::{Registry, RegistryStore};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct Fixture {
        catalog: SpendingCatalog,
        store: Arc<GrantStore>,
        government: Actor,
        grantee: Actor,
        grant_id: GrantId,
    }

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    fn fixture() -> Fixture {
        let registry = Registry::new(RegistryStore::in_memory().unwrap());
        let government = registry
            .register("gov@fund.example", "Ministry", Role::Government, "pw")
            .unwrap();
        let university = registry
            .register("uni@fund.example", "Uni", Role::University, "pw")
            .unwrap();
        let grantee = registry
            .register("lab@fund.example", "Lab", Role::Grantee, "pw")
            .unwrap();

        let store = Arc::new(GrantStore::in_memory().unwrap());
        let grant = store
            .insert_grant(
                "Programme",
                "",
                amount(dec!(100000)),
                &Currency::Usd,
                government.id,
                university.id,
            )
            .unwrap();
        store.assign_grantee(grant.id, grantee.id).unwrap();

        Fixture {
            catalog: SpendingCatalog::new(store.clone()),
            store,
            government,
            grantee,
            grant_id: grant.id,
        }
    }

    #[test]
    fn grantee_adds_item() {
        let f = fixture();
        let item = f
            .catalog
            .add_item(&f.grantee, f.grant_id, "Microscope", "Optical", amount(dec!(2500)))
            .unwrap();
        assert_eq!(item.grant_id, f.grant_id);
        assert_eq!(item.amount.value(), dec!(2500));
    }

    #[test]
    fn government_cannot_add_single_items() {
        let f = fixture();
        let result = f.catalog.add_item(
            &f.government,
            f.grant_id,
            "Microscope",
            "",
            amount(dec!(2500)),
        );
        assert!(matches!(result, Err(CatalogError::Authorization)));
    }

    #[test]
    fn import_counts_partial_success() {
        let f = fixture();
        let data = "Title,Description,Amount\n\
                    A,,100\n\
                    B,,200\n\
                    C,,not-a-number\n\
                    D,,400\n\
                    E,,500\n";

        let outcome = f
            .catalog
            .bulk_import(&f.government, f.grant_id, data.as_bytes())
            .unwrap();
        assert_eq!(outcome.created, 4);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(f.store.items_for_grant(f.grant_id).unwrap().len(), 4);
    }

    #[test]
    fn import_with_no_valid_rows_fails() {
        let f = fixture();
        let data = "Title,Description,Amount\n,,x\n,,y\n";
        let result = f
            .catalog
            .bulk_import(&f.government, f.grant_id, data.as_bytes());
        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert!(f.store.items_for_grant(f.grant_id).unwrap().is_empty());
    }

    #[test]
    fn import_is_government_only() {
        let f = fixture();
        let data = "Title,Description,Amount\nA,,100\n";
        let result = f
            .catalog
            .bulk_import(&f.grantee, f.grant_id, data.as_bytes());
        assert!(matches!(result, Err(CatalogError::Authorization)));
    }

    #[test]
    fn item_receipt_attaches_for_grantee() {
        let f = fixture();
        let item = f
            .catalog
            .add_item(&f.grantee, f.grant_id, "Reagents", "", amount(dec!(300)))
            .unwrap();

        let updated = f
            .catalog
            .attach_item_receipt(&f.grantee, item.id, "https://blobs/item.pdf")
            .unwrap();
        assert_eq!(updated.receipt_url.as_deref(), Some("https://blobs/item.pdf"));

        let denied = f
            .catalog
            .attach_item_receipt(&f.government, item.id, "https://blobs/x.pdf");
        assert!(matches!(denied, Err(CatalogError::Authorization)));
    }
}
