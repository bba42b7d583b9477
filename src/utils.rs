//! Identifier helpers

use bech32::Bech32m;
use uuid7::uuid7;

pub const CASH_FLOW_HRP: &str = "cf_";

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Fresh cash-flow id, e.g. `cf_1...`.
pub fn new_cash_flow_id() -> anyhow::Result<String> {
    new_uuid_to_bech32(CASH_FLOW_HRP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_flow_ids_carry_prefix() {
        let id = new_cash_flow_id().unwrap();
        assert!(id.starts_with("cf_1"));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_cash_flow_id().unwrap(), new_cash_flow_id().unwrap());
    }

    #[test]
    fn empty_hrp_fails() {
        assert!(new_uuid_to_bech32("").is_err());
    }
}
