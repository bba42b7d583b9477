//! Flow visualization: one node per lifecycle phase, plus a cancellation node
//! while the cash flow is on the cancellation branch.
use serde::Serialize;

use crate::cash_flow::TimeStamp;
use crate::stage::{
    CancellationStage, ComplianceStage, SettlementStage, StageSet, TransmissionLayer,
};
use crate::status::{CashFlowStatus, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeState {
    Completed,
    Current,
    Pending,
    Failed,
    Blocked,
    WaitingApproval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    pub id: &'static str,
    pub name: &'static str,
    pub status: NodeState,
    pub timestamp: Option<TimeStamp>,
}

/// One node per phase. A node's timestamp is the one stamped by the current
/// status on that phase's receipts; receipts inferred for passed steps carry
/// none.
pub fn visualize(status: CashFlowStatus, stages: &StageSet) -> Vec<FlowNode> {
    let mut nodes = vec![
        FlowNode {
            id: "stage_1",
            name: Phase::Netting.label(),
            status: netting_state(status),
            timestamp: stages.netting.as_ref().and_then(|s| s.timestamp),
        },
        FlowNode {
            id: "stage_2",
            name: Phase::Compliance.label(),
            status: compliance_state(status),
            timestamp: stages.compliance.as_ref().and_then(compliance_timestamp),
        },
        FlowNode {
            id: "stage_3",
            name: Phase::Settlement.label(),
            status: settlement_state(status),
            timestamp: stages.settlement.as_ref().and_then(settlement_timestamp),
        },
    ];

    if let Some(cancellation) = stages.cancellation.as_ref() {
        nodes.push(FlowNode {
            id: "stage_4",
            name: Phase::Cancellation.label(),
            status: cancellation_state(status),
            timestamp: cancellation_timestamp(cancellation),
        });
    }

    nodes
}

fn compliance_timestamp(stage: &ComplianceStage) -> Option<TimeStamp> {
    stage
        .aml_check
        .as_ref()
        .and_then(|aml| aml.timestamp)
        .or_else(|| stage.route_decision.as_ref().and_then(|r| r.timestamp))
        .or_else(|| stage.manual_approval.as_ref().and_then(|m| m.timestamp))
}

fn transmission_timestamp(layer: &TransmissionLayer) -> Option<TimeStamp> {
    layer
        .rmc
        .timestamp
        .or_else(|| layer.ftm.as_ref().and_then(|ftm| ftm.timestamp))
}

fn settlement_timestamp(stage: &SettlementStage) -> Option<TimeStamp> {
    stage
        .transmission_layer
        .as_ref()
        .and_then(transmission_timestamp)
        .or_else(|| stage.manual_confirm.as_ref().and_then(|m| m.timestamp))
        .or(stage.accounting_layer.timestamp)
}

fn cancellation_timestamp(stage: &CancellationStage) -> Option<TimeStamp> {
    stage
        .transmission_layer
        .as_ref()
        .and_then(transmission_timestamp)
        .or(stage.reversal_processing.timestamp)
}

fn netting_state(status: CashFlowStatus) -> NodeState {
    match status.phase() {
        Phase::Netting => NodeState::Current,
        Phase::Compliance | Phase::Settlement | Phase::Cancellation => NodeState::Completed,
    }
}

fn compliance_state(status: CashFlowStatus) -> NodeState {
    use CashFlowStatus::*;
    match status {
        ComplianceBlocked | ApprovalRejected => NodeState::Blocked,
        RouteDetermined | ApprovalApproved => NodeState::Completed,
        ComplianceChecking | ComplianceApproved | PendingApproval => NodeState::Current,
        _ => NodeState::Pending,
    }
}

fn settlement_state(status: CashFlowStatus) -> NodeState {
    use CashFlowStatus::*;
    match status {
        CoreSuccess => NodeState::Completed,
        RmcFailed | FtmFailed | ManualConfirmRejected | CoreFailed => NodeState::Failed,
        RmcSending | RmcSuccess | FtmSending | FtmSuccess | PendingManualConfirm
        | ManualConfirmApproved | CoreProcessing | CoreUnknown => NodeState::Current,
        _ => NodeState::Pending,
    }
}

fn cancellation_state(status: CashFlowStatus) -> NodeState {
    use CashFlowStatus::*;
    match status {
        CancelSuccess => NodeState::Completed,
        CancelRmcFailed | CancelFtmFailed | CancelFailed => NodeState::Failed,
        _ => NodeState::Current,
    }
}
