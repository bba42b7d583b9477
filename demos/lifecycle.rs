//! Walks one cash flow from netting to settled, printing the progress view
//! after each step and showing what a stale writer gets back.
//!
//! Set `SETTLEMENT_DB_PATH` to keep the database around, otherwise it lives
//! in a temp dir. `SETTLEMENT_LOG=debug` shows the projection logs.
use std::env;

use anyhow::Context;
use settlement_progress::{
    CashFlow, CashFlowStatus, ProductType, ProgressError, SettlementMethod, SettlementService,
    StatusChange, config::EngineConfig, logging, utils,
};

fn main() -> anyhow::Result<()> {
    let mut config = EngineConfig::from_env();
    logging::init(&config.log_level);

    // keep the temp dir alive until main returns
    let _temp_dir = if env::var("SETTLEMENT_DB_PATH").is_err() {
        let dir = tempfile::tempdir()?;
        config.db_path = dir.path().join("lifecycle.db");
        Some(dir)
    } else {
        None
    };

    let service = SettlementService::from_config(&config)?;

    let id = utils::new_cash_flow_id()?;
    let cf = service.register_cash_flow(CashFlow::new(
        id.clone(),
        SettlementMethod::Gross,
        ProductType::FxForward,
    ))?;
    println!("registered {} over {}", cf.id, cf.sending_route());

    let path = [
        StatusChange::to(CashFlowStatus::AutoNettingComplete),
        StatusChange::to(CashFlowStatus::ComplianceChecking),
        StatusChange::to(CashFlowStatus::ComplianceApproved).by("aml-engine"),
        StatusChange::to(CashFlowStatus::RouteDetermined),
        StatusChange::to(CashFlowStatus::RmcSending),
        StatusChange::to(CashFlowStatus::RmcSuccess),
        StatusChange::to(CashFlowStatus::FtmSending),
        StatusChange::to(CashFlowStatus::FtmSuccess),
        StatusChange::to(CashFlowStatus::CoreProcessing),
        StatusChange::to(CashFlowStatus::CoreSuccess),
    ];

    let mut version = cf.version;
    for change in path {
        let status = change.status;
        version = service
            .apply_status_transition(&id, version, change)
            .with_context(|| format!("moving {id} to {status}"))?;

        let progress = service.get_progress(&id)?;
        println!(
            "v{:<3} {:<32} {:>3}%  {}",
            progress.version,
            progress.current_status,
            progress.progress_percentage,
            progress.operation_guide.next_action
        );
    }

    // a writer still holding version 1
    match service.apply_status_transition(&id, 1, StatusChange::to(CashFlowStatus::CoreFailed)) {
        Err(ProgressError::VersionConflict {
            expected, actual, ..
        }) => println!("stale write rejected: expected v{expected}, stored v{actual}"),
        other => anyhow::bail!("stale write was not rejected: {other:?}"),
    }

    let progress = service.get_progress(&id)?;
    println!("{}", serde_json::to_string_pretty(&progress)?);

    Ok(())
}
