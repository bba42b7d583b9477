//! The composed progress view returned to callers.
use serde::Serialize;

use crate::cash_flow::{CashFlow, TimeStamp};
use crate::flow::{self, FlowNode};
use crate::guide::{GuideTable, OperationGuide};
use crate::progress;
use crate::stage::{self, CancellationStage, ComplianceStage, NettingStage, SettlementStage, Stage};
use crate::status::{CashFlowStatus, SendingRoute};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentProgress {
    pub cash_flow_id: String,
    pub status: CashFlowStatus,
    pub current_stage: &'static str,
    pub current_status: &'static str,
    pub sending_route: SendingRoute,
    pub progress_percentage: u8,
    pub netting_stage: Stage<NettingStage>,
    pub compliance_stage: Stage<ComplianceStage>,
    pub settlement_stage: Stage<SettlementStage>,
    pub cancellation_stage: Stage<CancellationStage>,
    pub flow_visualization: Vec<FlowNode>,
    pub operation_guide: OperationGuide,
    pub version: u64,
    pub last_modified: TimeStamp,
}

impl PaymentProgress {
    /// Route, stages, progress, flow and guidance for one record.
    pub fn build(cash_flow: &CashFlow, guides: &GuideTable) -> Self {
        let route = cash_flow.sending_route();
        let stages = stage::project(cash_flow, route);
        let progress = progress::aggregate(cash_flow.status);
        let flow_visualization = flow::visualize(cash_flow.status, &stages);
        let operation_guide = guides.resolve(cash_flow.status).clone();

        Self {
            cash_flow_id: cash_flow.id.clone(),
            status: cash_flow.status,
            current_stage: progress.stage_label,
            current_status: progress.status_label,
            sending_route: route,
            progress_percentage: progress.percentage,
            netting_stage: stages.netting,
            compliance_stage: stages.compliance,
            settlement_stage: stages.settlement,
            cancellation_stage: stages.cancellation,
            flow_visualization,
            operation_guide,
            version: cash_flow.version,
            last_modified: cash_flow.last_modified,
        }
    }
}
