//! Service layer API for cash-flow progress and status transitions
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use crate::cash_flow::{CashFlow, StatusChange};
use crate::config::EngineConfig;
use crate::error::ProgressError;
use crate::guard::ConcurrencyGuard;
use crate::guide::{GuideTable, OperationGuide};
use crate::store::{CashFlowStore, DEFAULT_TREE, SledStore};
use crate::view::PaymentProgress;

pub struct SettlementService {
    instance: Arc<sled::Db>,
    store: SledStore,
    guides: GuideTable,
}

impl SettlementService {
    /// Service over the default tree of `instance` with the built-in guidance.
    pub fn new(instance: Arc<sled::Db>) -> anyhow::Result<Self> {
        let guides = GuideTable::builtin().context("built-in guide table")?;
        Self::with_guides(instance, DEFAULT_TREE, guides)
    }

    pub fn with_guides(
        instance: Arc<sled::Db>,
        tree: &str,
        guides: GuideTable,
    ) -> anyhow::Result<Self> {
        let store = SledStore::open(&instance, tree)
            .with_context(|| format!("opening tree {tree}"))?;
        Ok(Self {
            instance,
            store,
            guides,
        })
    }

    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        let db = config
            .open_db()
            .with_context(|| format!("opening {}", config.db_path.display()))?;
        let guides = config.load_guide_table().context("loading guide table")?;
        Self::with_guides(Arc::new(db), &config.tree, guides)
    }

    pub fn db(&self) -> &Arc<sled::Db> {
        &self.instance
    }

    /// Load a cash flow, logging lookups of unknown ids.
    fn load_cash_flow(&self, id: &str) -> Result<CashFlow, ProgressError> {
        self.store.read(id).inspect_err(|e| {
            if let ProgressError::NotFound { .. } = e {
                warn!(cash_flow = %id, "cash flow not found");
            }
        })
    }

    /// Record a new cash flow handed over by netting. Fails with
    /// `AlreadyExists` if the id is taken.
    pub fn register_cash_flow(&self, cash_flow: CashFlow) -> Result<CashFlow, ProgressError> {
        self.store.insert(&cash_flow)?;
        debug!(
            cash_flow = %cash_flow.id,
            route = %cash_flow.sending_route(),
            "cash flow registered"
        );
        Ok(cash_flow)
    }

    /// Full progress view of a cash flow.
    pub fn get_progress(&self, id: &str) -> Result<PaymentProgress, ProgressError> {
        let cash_flow = self.load_cash_flow(id)?;
        Ok(PaymentProgress::build(&cash_flow, &self.guides))
    }

    /// Operator guidance for the current status of a cash flow.
    pub fn get_guidance(&self, id: &str) -> Result<OperationGuide, ProgressError> {
        let cash_flow = self.load_cash_flow(id)?;
        Ok(self.guides.resolve(cash_flow.status).clone())
    }

    /// Move a cash flow to a new status if nobody else has since
    /// `expected_version`. Returns the new version.
    pub fn apply_status_transition(
        &self,
        id: &str,
        expected_version: u64,
        change: StatusChange,
    ) -> Result<u64, ProgressError> {
        ConcurrencyGuard::new(&self.store).transition(id, expected_version, change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash_flow::ProductType;
    use crate::status::{CashFlowStatus, SettlementMethod};

    #[test]
    fn from_config_opens_store() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = EngineConfig {
            db_path: dir.path().join("configured.db"),
            tree: "eod".into(),
            ..EngineConfig::default()
        };
        let service = SettlementService::from_config(&config)?;

        let cf = CashFlow::new("cf_cfg".into(), SettlementMethod::Net, ProductType::FxSpot);
        service.register_cash_flow(cf)?;
        service.apply_status_transition("cf_cfg", 1, StatusChange::to(CashFlowStatus::AutoNettingComplete))?;

        assert_eq!(service.get_progress("cf_cfg")?.progress_percentage, 20);
        assert!(service.db().open_tree("eod")?.contains_key("cf_cfg")?);
        Ok(())
    }
}
