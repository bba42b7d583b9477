//! Settlement cash-flow lifecycle tracking.
//!
//! A cash flow carries a single [`status::CashFlowStatus`]. From it the crate
//! derives the sending route, the per-phase stage views, overall progress, a
//! flow visualization and operator guidance. Status changes go through
//! [`guard::ConcurrencyGuard`], which rejects writes made against a stale
//! version.

pub mod cash_flow;
pub mod config;
pub mod error;
pub mod flow;
pub mod guard;
pub mod guide;
pub mod logging;
pub mod progress;
pub mod service;
pub mod stage;
pub mod status;
pub mod store;
pub mod utils;
pub mod view;

pub use cash_flow::{CashFlow, ProductType, StatusChange, TimeStamp};
pub use error::{GuideTableError, ProgressError};
pub use service::SettlementService;
pub use status::{CashFlowStatus, Phase, SendingRoute, SettlementMethod};
pub use view::PaymentProgress;
