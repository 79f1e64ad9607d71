//! Application context - wires everything together

use grantflow_aml::FlagRegister;
use grantflow_catalog::SpendingCatalog;
use grantflow_contract::LogMirror;
use grantflow_ledger::{GrantLedger, GrantStore};
use grantflow_registry::{Registry, RegistryStore};
use grantflow_workflow::WorkflowEngine;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context - wires together all components over one data
/// directory:
///
/// ```text
/// data/
///   registry.db        actors and credentials
///   grants.db          grants, items, requests
///   aml/flags.jsonl    append-only flag register
///   contract/*.jsonl   indexer output, mirrored read-only
/// ```
pub struct AppContext {
    pub registry: Arc<Registry>,
    pub store: Arc<GrantStore>,
    pub ledger: GrantLedger,
    pub catalog: SpendingCatalog,
    pub engine: WorkflowEngine,
    pub flags: Arc<FlagRegister>,
    pub contract: LogMirror,
    data_path: PathBuf,
}

impl AppContext {
    /// Open (or initialize) a context at the given data directory.
    pub fn new(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let data_path = data_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_path)?;

        let registry = Arc::new(Registry::new(RegistryStore::new(
            data_path.join("registry.db"),
        )?));
        let store = Arc::new(GrantStore::new(data_path.join("grants.db"))?);
        let flags = Arc::new(FlagRegister::new(data_path.join("aml").join("flags.jsonl"))?);
        let contract = LogMirror::from_directory(data_path.join("contract"))?;

        Ok(Self {
            ledger: GrantLedger::new(store.clone(), registry.clone()),
            catalog: SpendingCatalog::new(store.clone()),
            engine: WorkflowEngine::new(store.clone(), flags.clone()),
            registry,
            store,
            flags,
            contract,
            data_path,
        })
    }

    /// Fully in-memory context (for testing)
    pub fn in_memory() -> Result<Self, anyhow::Error> {
        let registry = Arc::new(Registry::new(RegistryStore::in_memory()?));
        let store = Arc::new(GrantStore::in_memory()?);
        let flags = Arc::new(FlagRegister::in_memory());
        let contract = LogMirror::from_directory(PathBuf::from("/nonexistent"))?;

        Ok(Self {
            ledger: GrantLedger::new(store.clone(), registry.clone()),
            catalog: SpendingCatalog::new(store.clone()),
            engine: WorkflowEngine::new(store.clone(), flags.clone()),
            registry,
            store,
            flags,
            contract,
            data_path: PathBuf::new(),
        })
    }

    /// Get the data directory path
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantflow_core::{Amount, Currency, Role};
    use grantflow_ledger::RequestStatus;
    use grantflow_workflow::WorkflowError;
    use rust_decimal_macros::dec;

    fn amount(value: rust_decimal::Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    /// Full lifecycle: signup through payment, exercised the way the CLI
    /// drives it - one session per operation.
    #[test]
    fn end_to_end_disbursement_lifecycle() {
        let ctx = AppContext::in_memory().unwrap();

        ctx.registry
            .register("gov@fund.example", "Ministry", Role::Government, "gov-pw")
            .unwrap();
        let university = ctx
            .registry
            .register("uni@fund.example", "State University", Role::University, "uni-pw")
            .unwrap();
        let grantee = ctx
            .registry
            .register("lab@fund.example", "Research Lab", Role::Grantee, "lab-pw")
            .unwrap();

        // Government issues the grant
        let gov_session = ctx.registry.authenticate("gov@fund.example", "gov-pw").unwrap();
        let grant = ctx
            .ledger
            .create_grant(
                &gov_session.actor,
                "Genome programme",
                "Sequencing research",
                amount(dec!(10000)),
                &Currency::Usd,
                university.id,
            )
            .unwrap();

        // Government bulk-imports budget lines
        let csv = "Title,Description,Amount\n\
                   Sequencer time,Core facility,4000\n\
                   Reagents,Consumables,7000\n";
        let outcome = ctx
            .catalog
            .bulk_import(&gov_session.actor, grant.id, csv.as_bytes())
            .unwrap();
        assert_eq!(outcome.created, 2);
        ctx.registry.logout(&gov_session.token);

        // University assigns the grantee
        let uni_session = ctx.registry.authenticate("uni@fund.example", "uni-pw").unwrap();
        ctx.ledger
            .assign_grantee(&uni_session.actor, grant.id, grantee.id)
            .unwrap();
        ctx.registry.logout(&uni_session.token);

        // Grantee raises three requests
        let lab_session = ctx.registry.authenticate("lab@fund.example", "lab-pw").unwrap();
        let items = ctx.catalog.list_items(&lab_session.actor, grant.id).unwrap();
        let request_ids: Vec<_> = (0..3)
            .map(|i| {
                ctx.engine
                    .create_request(
                        &lab_session.actor,
                        grant.id,
                        items[i % items.len()].id,
                        amount(dec!(1000)),
                    )
                    .unwrap()
                    .id
            })
            .collect();
        ctx.registry.logout(&lab_session.token);

        // University approves the batch of three
        let uni_session = ctx.registry.authenticate("uni@fund.example", "uni-pw").unwrap();
        ctx.engine
            .approve_batch(&uni_session.actor, &request_ids)
            .unwrap();
        ctx.registry.logout(&uni_session.token);

        // Grantee attaches a receipt to the first request
        let lab_session = ctx.registry.authenticate("lab@fund.example", "lab-pw").unwrap();
        ctx.engine
            .attach_receipt(&lab_session.actor, request_ids[0], "https://blobs/r1.pdf")
            .unwrap();
        ctx.registry.logout(&lab_session.token);

        // External detector flags the second request
        ctx.engine
            .attach_receipt(
                &ctx.registry.authenticate("lab@fund.example", "lab-pw").unwrap().actor,
                request_ids[1],
                "https://blobs/r2.pdf",
            )
            .unwrap();
        ctx.flags
            .record(
                request_ids[1],
                "sanctions_list",
                grantflow_aml::Severity::High,
                "payee match",
            )
            .unwrap();

        // Government finalizes: first pays, second blocks
        let gov_session = ctx.registry.authenticate("gov@fund.example", "gov-pw").unwrap();
        let paid = ctx.engine.finalize(&gov_session.actor, request_ids[0]).unwrap();
        assert_eq!(paid.status, RequestStatus::Paid);

        let blocked = ctx.engine.finalize(&gov_session.actor, request_ids[1]);
        assert!(matches!(
            blocked,
            Err(WorkflowError::ComplianceBlocked { .. })
        ));
        assert_eq!(
            ctx.engine
                .get_request(&gov_session.actor, request_ids[1])
                .unwrap()
                .status,
            RequestStatus::Blocked
        );

        // Third never got a receipt: finalize refuses, state intact
        let third = ctx.engine.finalize(&gov_session.actor, request_ids[2]);
        assert!(matches!(third, Err(WorkflowError::InvalidState { .. })));

        // Government's transaction view sees all three requests
        let transactions = ctx.engine.list_requests(&gov_session.actor).unwrap();
        assert_eq!(transactions.len(), 3);
    }

    #[test]
    fn persistent_context_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let grant_id = {
            let ctx = AppContext::new(dir.path()).unwrap();
            ctx.registry
                .register("gov@fund.example", "Ministry", Role::Government, "pw")
                .unwrap();
            let university = ctx
                .registry
                .register("uni@fund.example", "Uni", Role::University, "pw")
                .unwrap();
            let session = ctx.registry.authenticate("gov@fund.example", "pw").unwrap();
            ctx.ledger
                .create_grant(
                    &session.actor,
                    "Durable grant",
                    "",
                    amount(dec!(500)),
                    &Currency::Eur,
                    university.id,
                )
                .unwrap()
                .id
        };

        let reopened = AppContext::new(dir.path()).unwrap();
        let session = reopened
            .registry
            .authenticate("gov@fund.example", "pw")
            .unwrap();
        let grant = reopened.ledger.get_grant(&session.actor, grant_id).unwrap();
        assert_eq!(grant.title, "Durable grant");
    }
}
