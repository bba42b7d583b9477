//! Operator guidance: what to do next for a given status.
//!
//! The table is data, not code. The built-in table is `guides.json`; a
//! deployment can load its own with [`GuideTable::from_path`]. Every table is
//! checked on load so that no status needing attention falls through to the
//! generic "no action needed" fallback.
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::GuideTableError;
use crate::status::{CashFlowStatus, StatusKind};

const BUILTIN_TABLE: &str = include_str!("guides.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Button,
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub label: String,
    pub url: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationGuide {
    pub next_action: String,
    pub action_entry: Option<ActionEntry>,
    pub notes: Option<String>,
    pub estimated_time: Option<String>,
}

// on-disk layout
#[derive(Deserialize)]
struct RawTable {
    fallback: OperationGuide,
    entries: BTreeMap<String, OperationGuide>,
}

#[derive(Debug, Clone)]
pub struct GuideTable {
    entries: HashMap<CashFlowStatus, OperationGuide>,
    fallback: OperationGuide,
}

impl GuideTable {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, GuideTableError> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GuideTableError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, GuideTableError> {
        let raw: RawTable = serde_json::from_str(json)?;

        let mut entries = HashMap::with_capacity(raw.entries.len());
        for (code, guide) in raw.entries {
            let status: CashFlowStatus = code
                .parse()
                .map_err(|_| GuideTableError::UnknownStatus(code.clone()))?;
            entries.insert(status, guide);
        }

        let table = Self {
            entries,
            fallback: raw.fallback,
        };
        table.validate()?;
        Ok(table)
    }

    /// Checks the table covers every status that is not plainly in flight,
    /// and that statuses waiting on an operator offer something to click.
    pub fn validate(&self) -> Result<(), GuideTableError> {
        for status in CashFlowStatus::ALL {
            let guide = match (self.entries.get(&status), status.kind()) {
                (Some(guide), _) => guide,
                (None, StatusKind::InFlight) => continue,
                (None, _) => return Err(GuideTableError::MissingEntry(status)),
            };

            if status.requires_operator_attention() && guide.action_entry.is_none() {
                return Err(GuideTableError::MissingAction(status));
            }
            if let Some(entry) = &guide.action_entry {
                if entry.kind == ActionKind::Link && entry.url.is_none() {
                    return Err(GuideTableError::LinkWithoutUrl(status));
                }
            }
        }
        Ok(())
    }

    /// Guidance for `status`, or the fallback for statuses with no entry.
    pub fn resolve(&self, status: CashFlowStatus) -> &OperationGuide {
        match self.entries.get(&status) {
            Some(guide) => guide,
            None => {
                if status.kind() != StatusKind::InFlight {
                    // validate() rules this out for loaded tables
                    error!(
                        target: "settlement_progress::anomaly",
                        status = %status,
                        "no guidance entry for a status that needs one, using fallback"
                    );
                }
                &self.fallback
            }
        }
    }

    pub fn fallback(&self) -> &OperationGuide {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
