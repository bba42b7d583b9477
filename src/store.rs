//! Cash-flow persistence.
//!
//! Records are minicbor-encoded and keyed by cash-flow id. Status writes are
//! a single `compare_and_swap` against the exact bytes the version check was
//! made on, so two writers holding the same version cannot both land.
use tracing::error;

use crate::cash_flow::{CashFlow, StatusChange, TimeStamp};
use crate::error::ProgressError;

pub const DEFAULT_TREE: &str = "cash_flows";

/// The storage collaborator the engine reads from and writes through.
pub trait CashFlowStore {
    fn read(&self, id: &str) -> Result<CashFlow, ProgressError>;

    fn insert(&self, cash_flow: &CashFlow) -> Result<(), ProgressError>;

    /// Apply `change` only if the stored version equals `expected_version`.
    /// Returns the new version, which is always `expected_version + 1`.
    fn write_status(
        &self,
        id: &str,
        expected_version: u64,
        change: &StatusChange,
    ) -> Result<u64, ProgressError>;
}

pub struct SledStore {
    tree: sled::Tree,
}

impl SledStore {
    pub fn open(db: &sled::Db, tree_name: &str) -> Result<Self, ProgressError> {
        Ok(Self {
            tree: db.open_tree(tree_name)?,
        })
    }

    fn decode(id: &str, bytes: &[u8]) -> Result<CashFlow, ProgressError> {
        minicbor::decode(bytes).map_err(|e| {
            error!(
                target: "settlement_progress::anomaly",
                cash_flow = %id,
                reason = %e,
                "stored cash flow could not be decoded"
            );
            ProgressError::from(e)
        })
    }

    fn not_found(id: &str) -> ProgressError {
        ProgressError::NotFound { id: id.to_string() }
    }
}

impl CashFlowStore for SledStore {
    fn read(&self, id: &str) -> Result<CashFlow, ProgressError> {
        let bytes = self.tree.get(id.as_bytes())?.ok_or_else(|| Self::not_found(id))?;
        Self::decode(id, &bytes)
    }

    fn insert(&self, cash_flow: &CashFlow) -> Result<(), ProgressError> {
        let encoded = minicbor::to_vec(cash_flow)?;
        self.tree
            .compare_and_swap(cash_flow.id.as_bytes(), None::<&[u8]>, Some(encoded))?
            .map_err(|_| ProgressError::AlreadyExists {
                id: cash_flow.id.clone(),
            })?;
        self.tree.flush()?;
        Ok(())
    }

    fn write_status(
        &self,
        id: &str,
        expected_version: u64,
        change: &StatusChange,
    ) -> Result<u64, ProgressError> {
        let current = self.tree.get(id.as_bytes())?.ok_or_else(|| Self::not_found(id))?;
        let mut record = Self::decode(id, &current)?;

        if record.version != expected_version {
            return Err(ProgressError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: record.version,
            });
        }

        let next_version = expected_version
            .checked_add(1)
            .ok_or_else(|| ProgressError::VersionExhausted { id: id.to_string() })?;

        record.status = change.status;
        if let Some(percentage) = change.progress_percentage {
            record.progress_percentage = percentage;
        }
        record.last_actor = change.actor.clone();
        record.version = next_version;
        record.last_modified = TimeStamp::now();
        let encoded = minicbor::to_vec(&record)?;

        // lands only if nobody wrote since `current` was read
        match self
            .tree
            .compare_and_swap(id.as_bytes(), Some(&current), Some(encoded))?
        {
            Ok(()) => {
                self.tree.flush()?;
                Ok(record.version)
            }
            Err(lost) => match lost.current {
                None => Err(Self::not_found(id)),
                Some(bytes) => Err(ProgressError::VersionConflict {
                    id: id.to_string(),
                    expected: expected_version,
                    actual: Self::decode(id, &bytes)?.version,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash_flow::ProductType;
    use crate::status::{CashFlowStatus, SettlementMethod};

    fn temp_store() -> (tempfile::TempDir, SledStore) {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path().join("store.db")).unwrap();
        let store = SledStore::open(&db, DEFAULT_TREE).unwrap();
        (dir, store)
    }

    fn sample(id: &str) -> CashFlow {
        CashFlow::new(id.into(), SettlementMethod::Gross, ProductType::FxForward)
    }

    #[test]
    fn insert_then_read() {
        let (_dir, store) = temp_store();
        store.insert(&sample("cf_a")).unwrap();

        let read = store.read("cf_a").unwrap();
        assert_eq!(read.status, CashFlowStatus::PendingNetting);
        assert_eq!(read.version, 1);
    }

    #[test]
    fn insert_twice_is_rejected() {
        let (_dir, store) = temp_store();
        store.insert(&sample("cf_a")).unwrap();

        let err = store.insert(&sample("cf_a")).unwrap_err();
        assert!(matches!(err, ProgressError::AlreadyExists { id } if id == "cf_a"));
    }

    #[test]
    fn read_missing() {
        let (_dir, store) = temp_store();
        let err = store.read("cf_missing").unwrap_err();
        assert!(matches!(err, ProgressError::NotFound { id } if id == "cf_missing"));
    }

    #[test]
    fn write_bumps_version_by_one() {
        let (_dir, store) = temp_store();
        store.insert(&sample("cf_a")).unwrap();

        let change = StatusChange::to(CashFlowStatus::AutoNettingComplete).with_percentage(20);
        let version = store.write_status("cf_a", 1, &change).unwrap();
        assert_eq!(version, 2);

        let read = store.read("cf_a").unwrap();
        assert_eq!(read.status, CashFlowStatus::AutoNettingComplete);
        assert_eq!(read.progress_percentage, 20);
        assert_eq!(read.version, 2);
    }

    #[test]
    fn stale_version_changes_nothing() {
        let (_dir, store) = temp_store();
        store.insert(&sample("cf_a")).unwrap();
        let before = store.read("cf_a").unwrap();

        let change = StatusChange::to(CashFlowStatus::ComplianceChecking);
        let err = store.write_status("cf_a", 7, &change).unwrap_err();
        assert!(matches!(
            err,
            ProgressError::VersionConflict { expected: 7, actual: 1, .. }
        ));
        assert_eq!(store.read("cf_a").unwrap(), before);
    }

    #[test]
    fn last_version_is_not_wrapped() {
        let (_dir, store) = temp_store();
        let mut cf = sample("cf_max");
        cf.version = u64::MAX;
        store.insert(&cf).unwrap();

        let change = StatusChange::to(CashFlowStatus::AutoNettingComplete);
        let err = store.write_status("cf_max", u64::MAX, &change).unwrap_err();
        assert!(matches!(err, ProgressError::VersionExhausted { id } if id == "cf_max"));
        assert_eq!(store.read("cf_max").unwrap(), cf);
    }

    #[test]
    fn garbage_record_is_an_encoding_error() {
        let (_dir, store) = temp_store();
        store.tree.insert("cf_bad", &[0xffu8, 0x00, 0x13][..]).unwrap();

        let err = store.read("cf_bad").unwrap_err();
        assert!(matches!(err, ProgressError::Encoding(_)));
    }
}
