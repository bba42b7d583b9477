//! Optimistic concurrency for status mutation.
//!
//! The guard owns no state. It validates the change, fills in the progress
//! percentage when the caller left it out, and hands the write to the store's
//! conditional update. A conflict is reported, never retried.
use tracing::{info, warn};

use crate::cash_flow::StatusChange;
use crate::error::ProgressError;
use crate::progress;
use crate::store::CashFlowStore;

pub struct ConcurrencyGuard<'a, S: CashFlowStore> {
    store: &'a S,
}

impl<'a, S: CashFlowStore> ConcurrencyGuard<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Move cash flow `id` to `change.status` if it is still at
    /// `expected_version`. Returns the new version.
    pub fn transition(
        &self,
        id: &str,
        expected_version: u64,
        change: StatusChange,
    ) -> Result<u64, ProgressError> {
        let percentage = match change.progress_percentage {
            Some(p) if p > 100 => return Err(ProgressError::InvalidPercentage(p)),
            Some(p) => p,
            None => progress::aggregate(change.status).percentage,
        };
        let change = StatusChange {
            progress_percentage: Some(percentage),
            ..change
        };

        let result = self.store.write_status(id, expected_version, &change);
        match &result {
            Ok(version) => info!(
                cash_flow = %id,
                status = %change.status,
                version = *version,
                "status transition applied"
            ),
            Err(ProgressError::VersionConflict { expected, actual, .. }) => warn!(
                cash_flow = %id,
                expected = *expected,
                actual = *actual,
                "status transition rejected: version conflict"
            ),
            Err(ProgressError::NotFound { .. }) => warn!(
                cash_flow = %id,
                "status transition rejected: unknown cash flow"
            ),
            Err(e) => warn!(cash_flow = %id, reason = %e, "status transition failed"),
        }
        result
    }
}
