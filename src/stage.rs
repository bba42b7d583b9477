//! Stage projection: the four per-phase detail views derived from a cash
//! flow's current status and sending route.
//!
//! Nothing here is persisted. Every call recomputes from the record alone, so
//! sub-receipts belonging to phases already passed are inferred rather than
//! remembered; inferred receipts carry no timestamp.
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::cash_flow::{CashFlow, ProductType, TimeStamp};
use crate::status::{CashFlowStatus, Phase, SendingRoute};

/// A phase that has either not been reached yet or has been entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage<T> {
    NotReached,
    Entered(T),
}

impl<T> Stage<T> {
    pub fn is_entered(&self) -> bool {
        matches!(self, Stage::Entered(_))
    }
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Stage::Entered(inner) => Some(inner),
            Stage::NotReached => None,
        }
    }
}

impl<T> From<Option<T>> for Stage<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Stage::NotReached, Stage::Entered)
    }
}

impl<T: Serialize> Serialize for Stage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stage::Entered(inner) => serializer.serialize_some(inner),
            Stage::NotReached => serializer.serialize_none(),
        }
    }
}

/// A receipt from one step: its outcome, when the outcome was recorded (if
/// the current status is what recorded it) and a short message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt<S> {
    pub status: S,
    pub timestamp: Option<TimeStamp>,
    pub message: &'static str,
}

impl<S> Receipt<S> {
    fn new(status: S, timestamp: Option<TimeStamp>, message: &'static str) -> Self {
        Self {
            status,
            timestamp,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NettingType {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NettingStatus {
    Pending,
    AutoComplete,
    ManualComplete,
    PendingDispatch,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrerequisiteCheck {
    pub product_type: ProductType,
    pub required_condition: &'static str,
    pub condition_met: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NettingStage {
    pub prerequisite_check: PrerequisiteCheck,
    pub netting_type: NettingType,
    pub status: NettingStatus,
    pub timestamp: Option<TimeStamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmlStatus {
    Checking,
    Approved,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub route: SendingRoute,
    pub timestamp: Option<TimeStamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A human decision: a compliance approval or a CBMNet manual confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualDecision {
    pub status: DecisionStatus,
    pub timestamp: Option<TimeStamp>,
    pub decided_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceStage {
    pub aml_check: Option<Receipt<AmlStatus>>,
    pub route_decision: Option<RouteDecision>,
    pub manual_approval: Option<ManualDecision>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransmissionStatus {
    Sending,
    Success,
    Failed,
}

/// RMC then FTM. `ftm` is only ever set once `rmc` succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransmissionLayer {
    pub rmc: Receipt<TransmissionStatus>,
    pub ftm: Option<Receipt<TransmissionStatus>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountingMode {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountingStatus {
    Processing,
    Success,
    Failed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountingLayer {
    pub mode: AccountingMode,
    pub status: AccountingStatus,
    pub timestamp: Option<TimeStamp>,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementStage {
    /// SWIFT route only.
    pub transmission_layer: Option<TransmissionLayer>,
    /// CBMNet route only.
    pub manual_confirm: Option<ManualDecision>,
    pub accounting_layer: AccountingLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReversalStatus {
    Processing,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationStage {
    pub transmission_layer: Option<TransmissionLayer>,
    pub reversal_processing: Receipt<ReversalStatus>,
}

/// All four stage views for one cash flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSet {
    pub netting: Stage<NettingStage>,
    pub compliance: Stage<ComplianceStage>,
    pub settlement: Stage<SettlementStage>,
    pub cancellation: Stage<CancellationStage>,
}

/// Build the stage views for `cash_flow` travelling over `route`.
pub fn project(cash_flow: &CashFlow, route: SendingRoute) -> StageSet {
    let status = cash_flow.status;
    let stamped = Some(cash_flow.last_modified);
    let actor = cash_flow.last_actor.clone();

    let stages = StageSet {
        netting: Stage::Entered(netting_stage(status, cash_flow.product_type, stamped)),
        compliance: compliance_stage(status, route, stamped, actor.clone()).into(),
        settlement: settlement_stage(status, route, stamped, actor).into(),
        cancellation: cancellation_stage(status, route, stamped).into(),
    };

    debug!(
        cash_flow = %cash_flow.id,
        status = %status,
        route = %route,
        compliance = stages.compliance.is_entered(),
        settlement = stages.settlement.is_entered(),
        cancellation = stages.cancellation.is_entered(),
        "stages projected"
    );

    stages
}

fn netting_stage(
    status: CashFlowStatus,
    product_type: ProductType,
    stamped: Option<TimeStamp>,
) -> NettingStage {
    use CashFlowStatus::*;

    let (netting_type, netting_status, timestamp) = match status {
        PendingNetting => (NettingType::Auto, NettingStatus::Pending, None),
        AutoNettingComplete => (NettingType::Auto, NettingStatus::AutoComplete, stamped),
        ManualNettingComplete => (NettingType::Manual, NettingStatus::ManualComplete, stamped),
        PendingDispatch => (NettingType::Auto, NettingStatus::PendingDispatch, stamped),
        // past netting; which kind ran is no longer known
        _ => (NettingType::Auto, NettingStatus::Completed, None),
    };

    NettingStage {
        prerequisite_check: PrerequisiteCheck {
            product_type,
            required_condition: product_type.netting_prerequisite(),
            condition_met: status != PendingNetting,
        },
        netting_type,
        status: netting_status,
        timestamp,
    }
}

fn compliance_stage(
    status: CashFlowStatus,
    route: SendingRoute,
    stamped: Option<TimeStamp>,
    actor: Option<String>,
) -> Option<ComplianceStage> {
    use CashFlowStatus::*;

    match status.phase() {
        Phase::Netting | Phase::Cancellation => return None,
        Phase::Compliance | Phase::Settlement => {}
    }

    let aml_check = match status {
        ComplianceChecking => Receipt::new(AmlStatus::Checking, stamped, "AML check in progress"),
        ComplianceBlocked => Receipt::new(AmlStatus::Blocked, stamped, "AML check failed, blocked"),
        ComplianceApproved => Receipt::new(AmlStatus::Approved, stamped, "AML check passed"),
        _ => Receipt::new(AmlStatus::Approved, None, "AML check passed"),
    };

    let route_decision = match status {
        RouteDetermined => Some(RouteDecision {
            route,
            timestamp: stamped,
        }),
        ComplianceChecking | ComplianceApproved | ComplianceBlocked => None,
        _ => Some(RouteDecision {
            route,
            timestamp: None,
        }),
    };

    let manual_approval = match status {
        PendingApproval => Some(ManualDecision {
            status: DecisionStatus::Pending,
            timestamp: stamped,
            decided_by: None,
        }),
        ApprovalApproved => Some(ManualDecision {
            status: DecisionStatus::Approved,
            timestamp: stamped,
            decided_by: actor,
        }),
        ApprovalRejected => Some(ManualDecision {
            status: DecisionStatus::Rejected,
            timestamp: stamped,
            decided_by: actor,
        }),
        _ => None,
    };

    Some(ComplianceStage {
        aml_check: Some(aml_check),
        route_decision,
        manual_approval,
    })
}

fn settlement_stage(
    status: CashFlowStatus,
    route: SendingRoute,
    stamped: Option<TimeStamp>,
    actor: Option<String>,
) -> Option<SettlementStage> {
    use CashFlowStatus::*;

    if status.phase() != Phase::Settlement {
        return None;
    }

    let (transmission_layer, manual_confirm) = match route {
        SendingRoute::Swift => (swift_transmission(status, stamped), None),
        SendingRoute::AltNetwork => (None, manual_confirm(status, stamped, actor)),
        SendingRoute::Internal => (None, None),
    };

    let accounting = |status, timestamp, message| AccountingLayer {
        mode: AccountingMode::Auto,
        status,
        timestamp,
        message,
    };
    let accounting_layer = match status {
        CoreProcessing => accounting(AccountingStatus::Processing, stamped, "Core posting in progress"),
        CoreSuccess => accounting(AccountingStatus::Success, stamped, "Posted"),
        CoreFailed => accounting(AccountingStatus::Failed, stamped, "Posting failed"),
        CoreUnknown => accounting(AccountingStatus::Unknown, stamped, "Posting outcome unknown"),
        _ => accounting(AccountingStatus::Processing, None, "Awaiting core posting"),
    };

    Some(SettlementStage {
        transmission_layer,
        manual_confirm,
        accounting_layer,
    })
}

fn swift_transmission(status: CashFlowStatus, stamped: Option<TimeStamp>) -> Option<TransmissionLayer> {
    use CashFlowStatus::*;
    use TransmissionStatus::*;

    let rmc = match status {
        RmcSending => Receipt::new(Sending, stamped, "RMC sending"),
        RmcFailed => {
            return Some(TransmissionLayer {
                rmc: Receipt::new(Failed, stamped, "RMC send failed"),
                ftm: None,
            });
        }
        RmcSuccess => Receipt::new(Success, stamped, "RMC sent"),
        FtmSending | FtmSuccess | FtmFailed | CoreProcessing | CoreSuccess | CoreFailed
        | CoreUnknown => Receipt::new(Success, None, "RMC sent"),
        _ => return None,
    };

    let ftm = match status {
        FtmSending => Some(Receipt::new(Sending, stamped, "FTM sending")),
        FtmFailed => Some(Receipt::new(Failed, stamped, "FTM send failed")),
        FtmSuccess => Some(Receipt::new(Success, stamped, "FTM sent")),
        CoreProcessing | CoreSuccess | CoreFailed | CoreUnknown => {
            Some(Receipt::new(Success, None, "FTM sent"))
        }
        _ => None,
    };

    Some(TransmissionLayer { rmc, ftm })
}

fn manual_confirm(
    status: CashFlowStatus,
    stamped: Option<TimeStamp>,
    actor: Option<String>,
) -> Option<ManualDecision> {
    use CashFlowStatus::*;

    let (decision, timestamp, decided_by) = match status {
        PendingManualConfirm => (DecisionStatus::Pending, stamped, None),
        ManualConfirmApproved => (DecisionStatus::Approved, stamped, actor),
        ManualConfirmRejected => (DecisionStatus::Rejected, stamped, actor),
        CoreProcessing | CoreSuccess | CoreFailed | CoreUnknown => (DecisionStatus::Approved, None, None),
        _ => return None,
    };

    Some(ManualDecision {
        status: decision,
        timestamp,
        decided_by,
    })
}

fn cancellation_stage(
    status: CashFlowStatus,
    route: SendingRoute,
    stamped: Option<TimeStamp>,
) -> Option<CancellationStage> {
    use CashFlowStatus::*;
    use TransmissionStatus::*;

    if !status.is_cancellation() {
        return None;
    }

    let transmission_layer = match route {
        SendingRoute::Swift => Some(match status {
            CancelRmcSending => TransmissionLayer {
                rmc: Receipt::new(Sending, stamped, "Cancellation RMC sending"),
                ftm: None,
            },
            CancelRmcFailed => TransmissionLayer {
                rmc: Receipt::new(Failed, stamped, "Cancellation RMC send failed"),
                ftm: None,
            },
            CancelFtmSending => TransmissionLayer {
                rmc: Receipt::new(Success, None, "Cancellation RMC sent"),
                ftm: Some(Receipt::new(Sending, stamped, "Cancellation FTM sending")),
            },
            CancelFtmFailed => TransmissionLayer {
                rmc: Receipt::new(Success, None, "Cancellation RMC sent"),
                ftm: Some(Receipt::new(Failed, stamped, "Cancellation FTM send failed")),
            },
            _ => TransmissionLayer {
                rmc: Receipt::new(Success, None, "Cancellation RMC sent"),
                ftm: Some(Receipt::new(Success, None, "Cancellation FTM sent")),
            },
        }),
        SendingRoute::AltNetwork | SendingRoute::Internal => None,
    };

    let reversal_processing = match status {
        CancelProcessing => Receipt::new(ReversalStatus::Processing, stamped, "Fund reversal in progress"),
        CancelSuccess => Receipt::new(ReversalStatus::Success, stamped, "Funds reversed"),
        CancelFailed => Receipt::new(ReversalStatus::Failed, stamped, "Fund reversal failed"),
        _ => Receipt::new(ReversalStatus::Processing, None, "Awaiting fund reversal"),
    };

    Some(CancellationStage {
        transmission_layer,
        reversal_processing,
    })
}
