//! The cash-flow record as stored, and the change a transition applies to it.
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::status::{CashFlowStatus, SendingRoute, SettlementMethod};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct TimeStamp(DateTime<Utc>);

impl TimeStamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .unwrap_or_default()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for TimeStamp {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

/// Product the cash flow was generated from. Decides which confirmation has to
/// be in place before netting may run.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    #[n(0)]
    FxSpot,
    #[n(1)]
    FxForward,
    #[n(2)]
    FxSwap,
    #[n(3)]
    InterbankLending,
    #[n(4)]
    MoneyMarketDeposit,
    #[n(5)]
    BondTrading,
    #[n(6)]
    BuyoutRepo,
    #[n(7)]
    PledgeRepo,
    #[n(8)]
    UnilateralCashFlow,
}

impl ProductType {
    /// The confirmation condition netting waits on.
    pub fn netting_prerequisite(self) -> &'static str {
        match self {
            ProductType::BondTrading | ProductType::BuyoutRepo | ProductType::PledgeRepo => {
                "Text confirmation passed"
            }
            ProductType::FxSpot
            | ProductType::FxForward
            | ProductType::FxSwap
            | ProductType::InterbankLending
            | ProductType::MoneyMarketDeposit
            | ProductType::UnilateralCashFlow => "Confirmation matched",
        }
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct CashFlow {
    #[n(0)]
    pub id: String, // bech32 encoded uuid7, "cf_" prefix
    #[n(1)]
    pub status: CashFlowStatus,
    #[n(2)]
    pub progress_percentage: u8,
    #[n(3)]
    pub version: u64,
    #[n(4)]
    pub settlement_method: SettlementMethod,
    #[n(5)]
    pub product_type: ProductType,
    #[n(6)]
    pub last_modified: TimeStamp,
    #[n(7)]
    pub last_actor: Option<String>, // who drove the latest transition, when known
}

impl CashFlow {
    /// A freshly netted-off cash flow as created by the netting subsystem.
    pub fn new(id: String, settlement_method: SettlementMethod, product_type: ProductType) -> Self {
        Self {
            id,
            status: CashFlowStatus::PendingNetting,
            progress_percentage: 0,
            version: 1,
            settlement_method,
            product_type,
            last_modified: TimeStamp::now(),
            last_actor: None,
        }
    }

    pub fn sending_route(&self) -> SendingRoute {
        SendingRoute::for_method(self.settlement_method)
    }
}

/// Fields a guarded transition writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: CashFlowStatus,
    /// `None` stores the percentage bucket of `status`.
    pub progress_percentage: Option<u8>,
    pub actor: Option<String>,
}

impl StatusChange {
    pub fn to(status: CashFlowStatus) -> Self {
        Self {
            status,
            progress_percentage: None,
            actor: None,
        }
    }
    pub fn with_percentage(mut self, percentage: u8) -> Self {
        self.progress_percentage = Some(percentage);
        self
    }
    pub fn by(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }
}
