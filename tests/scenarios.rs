use anyhow::Context;
use sled::open;
use std::sync::{Arc, Barrier};
use std::thread;

use settlement_progress::{
    CashFlow, CashFlowStatus, ProductType, ProgressError, SendingRoute, SettlementMethod,
    SettlementService, StatusChange,
    flow::NodeState,
    guide::ActionKind,
    stage::{ReversalStatus, TransmissionStatus},
    utils,
};

use tempfile::{TempDir, tempdir}; // Use for test db cleanup.

// Sled holds a file lock per database, so every test opens its own db in a
// temp dir. The TempDir is returned so it lives as long as the service.
fn service(name: &str) -> anyhow::Result<(TempDir, SettlementService)> {
    settlement_progress::logging::init("warn");

    let temp_dir = tempdir()?;
    let db = open(temp_dir.path().join(name))?;
    let service = SettlementService::new(Arc::new(db))?;
    Ok((temp_dir, service))
}

fn register(
    service: &SettlementService,
    method: SettlementMethod,
) -> anyhow::Result<CashFlow> {
    let id = utils::new_cash_flow_id()?;
    let cf = service.register_cash_flow(CashFlow::new(id, method, ProductType::FxSpot))?;
    Ok(cf)
}

/// Walk `id` through `path`, starting at version 1.
fn walk(
    service: &SettlementService,
    id: &str,
    path: &[CashFlowStatus],
) -> anyhow::Result<u64> {
    let mut version = 1;
    for status in path {
        version = service
            .apply_status_transition(id, version, StatusChange::to(*status))
            .with_context(|| format!("moving to {status}"))?;
    }
    Ok(version)
}

const SWIFT_HAPPY_PATH: [CashFlowStatus; 10] = [
    CashFlowStatus::AutoNettingComplete,
    CashFlowStatus::PendingDispatch,
    CashFlowStatus::ComplianceChecking,
    CashFlowStatus::ComplianceApproved,
    CashFlowStatus::RouteDetermined,
    CashFlowStatus::RmcSending,
    CashFlowStatus::RmcSuccess,
    CashFlowStatus::FtmSending,
    CashFlowStatus::FtmSuccess,
    CashFlowStatus::CoreSuccess,
];

#[test]
fn settled_over_swift() -> anyhow::Result<()> {
    let (_dir, service) = service("settled_over_swift.db")?;
    let cf = register(&service, SettlementMethod::Gross)?;

    let version = walk(&service, &cf.id, &SWIFT_HAPPY_PATH)?;
    assert_eq!(version, 1 + SWIFT_HAPPY_PATH.len() as u64);

    let progress = service.get_progress(&cf.id)?;
    assert_eq!(progress.sending_route, SendingRoute::Swift);
    assert_eq!(progress.current_stage, "Settlement execution & receipt");
    assert_eq!(progress.current_status, "Settlement complete");
    assert_eq!(progress.progress_percentage, 100);
    assert_eq!(progress.flow_visualization[2].status, NodeState::Completed);
    assert!(!progress.cancellation_stage.is_entered());
    assert_eq!(progress.version, version);

    Ok(())
}

#[test]
fn compliance_blocked() -> anyhow::Result<()> {
    let (_dir, service) = service("compliance_blocked.db")?;
    let cf = register(&service, SettlementMethod::Net)?;

    walk(
        &service,
        &cf.id,
        &[
            CashFlowStatus::AutoNettingComplete,
            CashFlowStatus::ComplianceChecking,
            CashFlowStatus::ComplianceBlocked,
        ],
    )?;

    let progress = service.get_progress(&cf.id)?;
    assert_eq!(progress.flow_visualization[1].status, NodeState::Blocked);
    assert_eq!(progress.progress_percentage, 40);

    let guide = service.get_guidance(&cf.id)?;
    assert!(guide.next_action.contains("manual compliance review"));
    assert_eq!(guide.action_entry.map(|a| a.kind), Some(ActionKind::Button));

    Ok(())
}

#[test]
fn rmc_failed() -> anyhow::Result<()> {
    let (_dir, service) = service("rmc_failed.db")?;
    let cf = register(&service, SettlementMethod::Centralized)?;

    walk(
        &service,
        &cf.id,
        &[
            CashFlowStatus::AutoNettingComplete,
            CashFlowStatus::ComplianceChecking,
            CashFlowStatus::ComplianceApproved,
            CashFlowStatus::RouteDetermined,
            CashFlowStatus::RmcSending,
            CashFlowStatus::RmcFailed,
        ],
    )?;

    let progress = service.get_progress(&cf.id)?;
    let settlement = progress.settlement_stage.as_ref().context("settlement stage")?;
    let layer = settlement
        .transmission_layer
        .as_ref()
        .context("transmission layer")?;
    assert_eq!(layer.rmc.status, TransmissionStatus::Failed);
    assert!(layer.ftm.is_none());
    assert_eq!(progress.flow_visualization[2].status, NodeState::Failed);
    assert!(progress.operation_guide.next_action.contains("retry the transmission"));

    Ok(())
}

#[test]
fn cancellation_completes() -> anyhow::Result<()> {
    let (_dir, service) = service("cancellation_completes.db")?;
    let cf = register(&service, SettlementMethod::Gross)?;

    walk(
        &service,
        &cf.id,
        &[
            CashFlowStatus::AutoNettingComplete,
            CashFlowStatus::ComplianceChecking,
            CashFlowStatus::ComplianceApproved,
            CashFlowStatus::RouteDetermined,
            CashFlowStatus::RmcSending,
            CashFlowStatus::CancelRmcSending,
            CashFlowStatus::CancelFtmSending,
            CashFlowStatus::CancelProcessing,
            CashFlowStatus::CancelSuccess,
        ],
    )?;

    let progress = service.get_progress(&cf.id)?;
    assert_eq!(progress.progress_percentage, 90);
    assert_eq!(progress.flow_visualization.len(), 4);
    assert_eq!(progress.flow_visualization[3].status, NodeState::Completed);

    let cancellation = progress
        .cancellation_stage
        .as_ref()
        .context("cancellation stage")?;
    assert_eq!(cancellation.reversal_processing.status, ReversalStatus::Success);

    Ok(())
}

#[test]
fn stale_version_conflicts() -> anyhow::Result<()> {
    let (_dir, service) = service("stale_version_conflicts.db")?;
    let cf = register(&service, SettlementMethod::Gross)?;

    // version 3 after two transitions
    walk(
        &service,
        &cf.id,
        &[CashFlowStatus::AutoNettingComplete, CashFlowStatus::PendingDispatch],
    )?;

    let err = service
        .apply_status_transition(&cf.id, 2, StatusChange::to(CashFlowStatus::ComplianceChecking))
        .unwrap_err();
    match err {
        ProgressError::VersionConflict {
            id,
            expected,
            actual,
        } => {
            assert_eq!(id, cf.id);
            assert_eq!(expected, 2);
            assert_eq!(actual, 3);
        }
        other => panic!("expected a version conflict, got {other:?}"),
    }

    let progress = service.get_progress(&cf.id)?;
    assert_eq!(progress.status, CashFlowStatus::PendingDispatch);
    assert_eq!(progress.version, 3);

    Ok(())
}

#[test]
fn unknown_cash_flow() -> anyhow::Result<()> {
    let (_dir, service) = service("unknown_cash_flow.db")?;
    let id = utils::new_cash_flow_id()?;

    let err = service
        .apply_status_transition(&id, 1, StatusChange::to(CashFlowStatus::CoreSuccess))
        .unwrap_err();
    assert!(matches!(err, ProgressError::NotFound { id: ref missing } if *missing == id));

    // nothing was written for the id
    assert!(matches!(
        service.get_progress(&id),
        Err(ProgressError::NotFound { .. })
    ));
    assert!(matches!(
        service.get_guidance(&id),
        Err(ProgressError::NotFound { .. })
    ));
    assert_eq!(service.db().open_tree("cash_flows")?.len(), 0);

    Ok(())
}

#[test]
fn concurrent_writers_one_wins() -> anyhow::Result<()> {
    let (_dir, service) = service("concurrent_writers_one_wins.db")?;
    let cf = register(&service, SettlementMethod::Gross)?;
    let service = Arc::new(service);

    let targets = [
        CashFlowStatus::AutoNettingComplete,
        CashFlowStatus::ManualNettingComplete,
        CashFlowStatus::AutoNettingComplete,
        CashFlowStatus::ManualNettingComplete,
    ];
    let barrier = Arc::new(Barrier::new(targets.len()));

    let handles: Vec<_> = targets
        .into_iter()
        .map(|status| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            let id = cf.id.clone();
            thread::spawn(move || {
                barrier.wait();
                (status, service.apply_status_transition(&id, 1, StatusChange::to(status)))
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("writer thread panicked"))
        .collect();

    let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(*winners[0].1.as_ref().unwrap(), 2);

    for (_, result) in results.iter().filter(|(_, r)| r.is_err()) {
        assert!(matches!(
            result,
            Err(ProgressError::VersionConflict { expected: 1, actual: 2, .. })
        ));
    }

    // the stored status is the winner's
    let progress = service.get_progress(&cf.id)?;
    assert_eq!(progress.status, winners[0].0);
    assert_eq!(progress.version, 2);

    Ok(())
}

#[test]
fn internal_route_skips_transmission() -> anyhow::Result<()> {
    let (_dir, service) = service("internal_route_skips_transmission.db")?;
    let cf = register(&service, SettlementMethod::NotRequired)?;

    walk(
        &service,
        &cf.id,
        &[
            CashFlowStatus::AutoNettingComplete,
            CashFlowStatus::ComplianceChecking,
            CashFlowStatus::ComplianceApproved,
            CashFlowStatus::RouteDetermined,
            CashFlowStatus::CoreUnknown,
        ],
    )?;

    let progress = service.get_progress(&cf.id)?;
    assert_eq!(progress.sending_route, SendingRoute::Internal);
    let settlement = progress.settlement_stage.as_ref().context("settlement stage")?;
    assert!(settlement.transmission_layer.is_none());
    assert_eq!(progress.flow_visualization[2].status, NodeState::Current);

    let guide = service.get_guidance(&cf.id)?;
    assert_eq!(
        guide.action_entry.and_then(|a| a.action).as_deref(),
        Some("query_internal_account")
    );

    Ok(())
}

#[test]
fn approval_records_approver() -> anyhow::Result<()> {
    let (_dir, service) = service("approval_records_approver.db")?;
    let cf = register(&service, SettlementMethod::OtherAgent)?;

    let version = walk(
        &service,
        &cf.id,
        &[
            CashFlowStatus::ManualNettingComplete,
            CashFlowStatus::ComplianceChecking,
            CashFlowStatus::ComplianceApproved,
            CashFlowStatus::PendingApproval,
        ],
    )?;
    service.apply_status_transition(
        &cf.id,
        version,
        StatusChange::to(CashFlowStatus::ApprovalApproved).by("head-of-ops"),
    )?;

    let progress = service.get_progress(&cf.id)?;
    let approval = progress
        .compliance_stage
        .as_ref()
        .and_then(|c| c.manual_approval.as_ref())
        .context("manual approval")?;
    assert_eq!(approval.decided_by.as_deref(), Some("head-of-ops"));
    assert_eq!(progress.flow_visualization[1].status, NodeState::Completed);

    Ok(())
}
