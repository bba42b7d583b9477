//! The closed status space of a settlement cash flow and the route it travels.
//!
//! Every cash flow holds exactly one [`CashFlowStatus`]. Statuses belong to one
//! of four ordered [`Phase`]s; membership is fixed by [`CashFlowStatus::phase`].
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

/// The four lifecycle phases, in order. Cancellation is an absorbing branch
/// that can be entered from any phase after netting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Netting,
    Compliance,
    Settlement,
    Cancellation,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Netting => "Netting",
            Phase::Compliance => "Compliance",
            Phase::Settlement => "Settlement execution & receipt",
            Phase::Cancellation => "Cancellation",
        }
    }
}

/// How a status should be read by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusKind {
    /// Moving on its own, nothing to look at.
    InFlight,
    /// Parked until an external system or a person acts.
    Waiting,
    Failed,
    Blocked,
    /// Outcome not known; someone has to find out.
    Indeterminate,
    Terminal,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
#[serde(rename_all = "kebab-case")]
pub enum CashFlowStatus {
    // netting
    #[n(0)]
    PendingNetting,
    #[n(1)]
    AutoNettingComplete,
    #[n(2)]
    ManualNettingComplete,
    #[n(3)]
    PendingDispatch,
    // compliance
    #[n(10)]
    ComplianceChecking,
    #[n(11)]
    ComplianceApproved,
    #[n(12)]
    ComplianceBlocked,
    #[n(13)]
    PendingApproval,
    #[n(14)]
    ApprovalApproved,
    #[n(15)]
    ApprovalRejected,
    #[n(16)]
    RouteDetermined,
    // settlement, SWIFT transmission
    #[n(20)]
    RmcSending,
    #[n(21)]
    RmcSuccess,
    #[n(22)]
    RmcFailed,
    #[n(23)]
    FtmSending,
    #[n(24)]
    FtmSuccess,
    #[n(25)]
    FtmFailed,
    // settlement, alternate network
    #[n(30)]
    PendingManualConfirm,
    #[n(31)]
    ManualConfirmApproved,
    #[n(32)]
    ManualConfirmRejected,
    // settlement, accounting layer
    #[n(40)]
    CoreProcessing,
    #[n(41)]
    CoreSuccess,
    #[n(42)]
    CoreFailed,
    #[n(43)]
    CoreUnknown,
    // cancellation
    #[n(50)]
    CancelRmcSending,
    #[n(51)]
    CancelRmcFailed,
    #[n(52)]
    CancelFtmSending,
    #[n(53)]
    CancelFtmFailed,
    #[n(54)]
    CancelProcessing,
    #[n(55)]
    CancelSuccess,
    #[n(56)]
    CancelFailed,
}

impl CashFlowStatus {
    /// Every status, grouped by phase in lifecycle order.
    pub const ALL: [CashFlowStatus; 31] = [
        CashFlowStatus::PendingNetting,
        CashFlowStatus::AutoNettingComplete,
        CashFlowStatus::ManualNettingComplete,
        CashFlowStatus::PendingDispatch,
        CashFlowStatus::ComplianceChecking,
        CashFlowStatus::ComplianceApproved,
        CashFlowStatus::ComplianceBlocked,
        CashFlowStatus::PendingApproval,
        CashFlowStatus::ApprovalApproved,
        CashFlowStatus::ApprovalRejected,
        CashFlowStatus::RouteDetermined,
        CashFlowStatus::RmcSending,
        CashFlowStatus::RmcSuccess,
        CashFlowStatus::RmcFailed,
        CashFlowStatus::FtmSending,
        CashFlowStatus::FtmSuccess,
        CashFlowStatus::FtmFailed,
        CashFlowStatus::PendingManualConfirm,
        CashFlowStatus::ManualConfirmApproved,
        CashFlowStatus::ManualConfirmRejected,
        CashFlowStatus::CoreProcessing,
        CashFlowStatus::CoreSuccess,
        CashFlowStatus::CoreFailed,
        CashFlowStatus::CoreUnknown,
        CashFlowStatus::CancelRmcSending,
        CashFlowStatus::CancelRmcFailed,
        CashFlowStatus::CancelFtmSending,
        CashFlowStatus::CancelFtmFailed,
        CashFlowStatus::CancelProcessing,
        CashFlowStatus::CancelSuccess,
        CashFlowStatus::CancelFailed,
    ];

    pub fn phase(self) -> Phase {
        use CashFlowStatus::*;
        match self {
            PendingNetting | AutoNettingComplete | ManualNettingComplete | PendingDispatch => {
                Phase::Netting
            }
            ComplianceChecking | ComplianceApproved | ComplianceBlocked | PendingApproval
            | ApprovalApproved | ApprovalRejected | RouteDetermined => Phase::Compliance,
            RmcSending | RmcSuccess | RmcFailed | FtmSending | FtmSuccess | FtmFailed
            | PendingManualConfirm | ManualConfirmApproved | ManualConfirmRejected
            | CoreProcessing | CoreSuccess | CoreFailed | CoreUnknown => Phase::Settlement,
            CancelRmcSending | CancelRmcFailed | CancelFtmSending | CancelFtmFailed
            | CancelProcessing | CancelSuccess | CancelFailed => Phase::Cancellation,
        }
    }

    pub fn kind(self) -> StatusKind {
        use CashFlowStatus::*;
        match self {
            PendingNetting | PendingDispatch | ComplianceChecking | PendingApproval
            | PendingManualConfirm | CancelRmcSending | CancelFtmSending | CancelProcessing => {
                StatusKind::Waiting
            }
            ComplianceBlocked | ApprovalRejected => StatusKind::Blocked,
            RmcFailed | FtmFailed | ManualConfirmRejected | CoreFailed | CancelRmcFailed
            | CancelFtmFailed | CancelFailed => StatusKind::Failed,
            CoreUnknown => StatusKind::Indeterminate,
            CoreSuccess | CancelSuccess => StatusKind::Terminal,
            AutoNettingComplete | ManualNettingComplete | ComplianceApproved | ApprovalApproved
            | RouteDetermined | RmcSending | RmcSuccess | FtmSending | FtmSuccess
            | ManualConfirmApproved | CoreProcessing => StatusKind::InFlight,
        }
    }

    /// True when nothing will move until a person acts.
    pub fn requires_operator_attention(self) -> bool {
        match self.kind() {
            StatusKind::Failed | StatusKind::Blocked | StatusKind::Indeterminate => true,
            StatusKind::Waiting => matches!(
                self,
                CashFlowStatus::PendingApproval | CashFlowStatus::PendingManualConfirm
            ),
            StatusKind::InFlight | StatusKind::Terminal => false,
        }
    }

    pub fn is_cancellation(self) -> bool {
        self.phase() == Phase::Cancellation
    }

    /// Stable code used in guidance tables and serialized views.
    pub fn code(self) -> &'static str {
        use CashFlowStatus::*;
        match self {
            PendingNetting => "pending-netting",
            AutoNettingComplete => "auto-netting-complete",
            ManualNettingComplete => "manual-netting-complete",
            PendingDispatch => "pending-dispatch",
            ComplianceChecking => "compliance-checking",
            ComplianceApproved => "compliance-approved",
            ComplianceBlocked => "compliance-blocked",
            PendingApproval => "pending-approval",
            ApprovalApproved => "approval-approved",
            ApprovalRejected => "approval-rejected",
            RouteDetermined => "route-determined",
            RmcSending => "rmc-sending",
            RmcSuccess => "rmc-success",
            RmcFailed => "rmc-failed",
            FtmSending => "ftm-sending",
            FtmSuccess => "ftm-success",
            FtmFailed => "ftm-failed",
            PendingManualConfirm => "pending-manual-confirm",
            ManualConfirmApproved => "manual-confirm-approved",
            ManualConfirmRejected => "manual-confirm-rejected",
            CoreProcessing => "core-processing",
            CoreSuccess => "core-success",
            CoreFailed => "core-failed",
            CoreUnknown => "core-unknown",
            CancelRmcSending => "cancel-rmc-sending",
            CancelRmcFailed => "cancel-rmc-failed",
            CancelFtmSending => "cancel-ftm-sending",
            CancelFtmFailed => "cancel-ftm-failed",
            CancelProcessing => "cancel-processing",
            CancelSuccess => "cancel-success",
            CancelFailed => "cancel-failed",
        }
    }

    /// Operator-facing label.
    pub fn label(self) -> &'static str {
        use CashFlowStatus::*;
        match self {
            PendingNetting => "Pending netting",
            AutoNettingComplete => "Auto netting complete",
            ManualNettingComplete => "Manual netting complete",
            PendingDispatch => "Pending dispatch",
            ComplianceChecking => "Compliance checking",
            ComplianceApproved => "Compliance approved",
            ComplianceBlocked => "Compliance blocked",
            PendingApproval => "Pending approval",
            ApprovalApproved => "Approval approved",
            ApprovalRejected => "Approval rejected",
            RouteDetermined => "Route determined",
            RmcSending => "RMC sending",
            RmcSuccess => "RMC sent",
            RmcFailed => "RMC send failed",
            FtmSending => "FTM sending",
            FtmSuccess => "FTM sent",
            FtmFailed => "FTM send failed",
            PendingManualConfirm => "Pending manual confirmation",
            ManualConfirmApproved => "Manual confirmation approved",
            ManualConfirmRejected => "Manual confirmation rejected",
            CoreProcessing => "Core posting in progress",
            CoreSuccess => "Settlement complete",
            CoreFailed => "Core posting failed",
            CoreUnknown => "Core posting unknown",
            CancelRmcSending => "Cancellation RMC sending",
            CancelRmcFailed => "Cancellation RMC send failed",
            CancelFtmSending => "Cancellation FTM sending",
            CancelFtmFailed => "Cancellation FTM send failed",
            CancelProcessing => "Cancellation processing",
            CancelSuccess => "Cancellation complete",
            CancelFailed => "Cancellation failed",
        }
    }
}

impl fmt::Display for CashFlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CashFlowStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CashFlowStatus::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| ProgressError::UnknownStatus(s.to_string()))
    }
}

/// Settlement method recorded on the cash flow's settlement instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    minicbor::Encode,
    minicbor::Decode,
)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementMethod {
    #[n(0)]
    Gross,
    #[n(1)]
    Net,
    #[n(2)]
    Centralized,
    #[n(3)]
    NotRequired,
    #[n(4)]
    OurAgent,
    #[n(5)]
    OtherAgent,
}

/// Network a cash flow is transmitted over. Never stored, always derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SendingRoute {
    #[serde(rename = "SWIFT")]
    Swift,
    #[serde(rename = "CBMNet")]
    AltNetwork,
    #[serde(rename = "INTERNAL")]
    Internal,
}

impl SendingRoute {
    /// Derive the route from the settlement method.
    ///
    /// Agent methods default to SWIFT. The real choice depends on standing
    /// settlement instruction parameters that are not carried on the cash flow.
    pub fn for_method(method: SettlementMethod) -> Self {
        match method {
            SettlementMethod::Gross | SettlementMethod::Net | SettlementMethod::Centralized => {
                SendingRoute::Swift
            }
            SettlementMethod::NotRequired => SendingRoute::Internal,
            SettlementMethod::OurAgent | SettlementMethod::OtherAgent => SendingRoute::Swift,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SendingRoute::Swift => "SWIFT",
            SendingRoute::AltNetwork => "CBMNet",
            SendingRoute::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for SendingRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
