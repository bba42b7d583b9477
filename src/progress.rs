//! Where a cash flow stands overall: stage label, status label, percentage.
use serde::Serialize;

use crate::status::{CashFlowStatus, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub phase: Phase,
    pub stage_label: &'static str,
    pub status_label: &'static str,
    pub percentage: u8,
}

/// Bucket a status into its progress band.
///
/// Cancellation is checked first since it can be entered from any other phase.
pub fn aggregate(status: CashFlowStatus) -> Progress {
    let phase = status.phase();
    let percentage = match phase {
        Phase::Cancellation => 90,
        Phase::Settlement if status == CashFlowStatus::CoreSuccess => 100,
        Phase::Settlement => 70,
        Phase::Compliance => 40,
        Phase::Netting => 20,
    };

    Progress {
        phase,
        stage_label: phase.label(),
        status_label: status.label(),
        percentage,
    }
}

/// Progress shown for a cash flow with no status recorded.
pub fn not_started() -> Progress {
    Progress {
        phase: Phase::Netting,
        stage_label: Phase::Netting.label(),
        status_label: "Pending",
        percentage: 0,
    }
}
