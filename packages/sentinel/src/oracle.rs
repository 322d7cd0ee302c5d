//! Price Oracle Client
//!
//! Spot prices from the mirror oracle and the anchor money-market exchange rate.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::warn;

use crate::payload::{self, EpochStateResponse, PriceResponse};
use crate::query::{query_contract, QueryError, StateQuerier};
use crate::registry::{AddressRegistry, WalletRole};

/// Quote unit for every oracle price
pub const QUOTE_DENOM: &str = "uusd";

pub struct PriceOracleClient<'a> {
    registry: &'a AddressRegistry,
    querier: &'a dyn StateQuerier,
}

impl<'a> PriceOracleClient<'a> {
    pub fn new(registry: &'a AddressRegistry, querier: &'a dyn StateQuerier) -> Self {
        Self { registry, querier }
    }

    /// Oracle price of the token at `base_asset`, quoted in UST
    pub fn price(&self, base_asset: &str) -> Result<Decimal, QueryError> {
        let oracle = self.contract(WalletRole::MirrorOracle)?;
        let query = json!({ "price": { "base_asset": base_asset, "quote_asset": QUOTE_DENOM } });
        let result = query_contract::<PriceResponse>(self.querier, oracle, &query)
            .and_then(|r| decimal(&r.rate));
        if let Err(e) = &result {
            warn!(base_asset, "Oracle price query failed: {}", e);
        }
        result
    }

    /// Money-market exchange rate of the stable-yield wrapper token
    pub fn exchange_rate(&self) -> Result<Decimal, QueryError> {
        let market = self.contract(WalletRole::AncContract)?;
        let result = query_contract::<EpochStateResponse>(
            self.querier,
            market,
            &json!({ "epoch_state": {} }),
        )
        .and_then(|r| decimal(&r.exchange_rate));
        if let Err(e) = &result {
            warn!("Exchange rate query failed: {}", e);
        }
        result
    }

    fn contract(&self, role: WalletRole) -> Result<&'a str, QueryError> {
        self.registry
            .wallets
            .address(role)
            .ok_or(QueryError::NotConfigured(role.key()))
    }
}

fn decimal(text: &str) -> Result<Decimal, QueryError> {
    payload::parse_decimal(text).map_err(|e| QueryError::Response(e.to_string()))
}
