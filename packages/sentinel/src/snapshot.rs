//! State Snapshots
//!
//! Periodic views of our wallets, the money-market rate and pool reserves,
//! published alongside the transaction-driven events. The host decides when to
//! take them; nothing here is scheduled.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use serde_json::json;
use tracing::{debug, warn};

use crate::event::{
    AccountSnapshot, ClassifiedEvent, ContractSnapshot, EventPayload, RateSnapshot,
    ReserveSnapshot, Topic,
};
use crate::message::{denom_symbol, symbol_denom};
use crate::oracle::PriceOracleClient;
use crate::payload::{AssetInfo, BalanceResponse, PoolResponse};
use crate::query::{query_contract, QueryError, StateQuerier};
use crate::registry::{AddressRegistry, Venue, WalletRole};

/// Pairs under maintenance, never included in reserve snapshots
pub const RESERVE_EXCLUSIONS: [&str; 2] = ["BLUNA-NLUNA", "BETH-NETH"];

const UST: &str = "UST";
const LUNA: &str = "LUNA";

pub struct SnapshotBuilder<'a> {
    registry: &'a AddressRegistry,
    querier: &'a dyn StateQuerier,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(registry: &'a AddressRegistry, querier: &'a dyn StateQuerier) -> Self {
        Self { registry, querier }
    }

    /// Balances and sequence of the mirror operating wallet
    ///
    /// Token balances that fail to load are left out; the wrapper-token balance
    /// is mandatory.
    pub fn account_snapshot(&self) -> Result<ClassifiedEvent, QueryError> {
        let wallet = self.wallet(WalletRole::MirrorWallet)?;
        let sequence = self.querier.account_sequence(wallet)?;

        let mut balance = BTreeMap::new();
        for symbol in [UST, LUNA] {
            if let Some(denom) = symbol_denom(symbol) {
                let amount = self.querier.bank_balance(wallet, denom)?;
                balance.insert(symbol.to_string(), amount.to_string());
            }
        }
        for (asset, token) in self.registry.mirror_tokens.iter() {
            match self.token_balance(token, wallet) {
                Ok(amount) => {
                    balance.insert(asset.to_string(), amount);
                }
                Err(e) => warn!(asset, "Token balance unavailable: {}", e),
            }
        }

        let wrapper = self
            .registry
            .stable_yield_token()
            .ok_or(QueryError::NotConfigured("AUST"))?;
        let aust = self.token_balance(wrapper, wallet)?;

        Ok(ClassifiedEvent::new(
            Topic::MirrorUpdateAccount,
            EventPayload::AccountSnapshot(AccountSnapshot {
                balance,
                sequence,
                aust,
            }),
        ))
    }

    /// UST held by the execution contract, with the terra wallet's sequence
    pub fn contract_snapshot(&self) -> Result<ClassifiedEvent, QueryError> {
        let wallet = self.wallet(WalletRole::TerraWallet)?;
        let contract = self.wallet(WalletRole::TerraContract)?;
        let sequence = self.querier.account_sequence(wallet)?;
        let balance = self.querier.bank_balance(contract, "uusd")?;

        Ok(ClassifiedEvent::new(
            Topic::TerraUpdateAccount,
            EventPayload::ContractSnapshot(ContractSnapshot {
                balance: balance.to_string(),
                sequence,
            }),
        ))
    }

    pub fn rate_snapshot(&self) -> Result<ClassifiedEvent, QueryError> {
        let rate = PriceOracleClient::new(self.registry, self.querier).exchange_rate()?;
        let anc_rate = rate
            .to_f64()
            .ok_or_else(|| QueryError::Response(rate.to_string()))?;
        Ok(ClassifiedEvent::new(
            Topic::AncRate,
            EventPayload::RateSnapshot(RateSnapshot { anc_rate }),
        ))
    }

    /// Reserves of every pair of `venue`, keyed by pair then asset symbol
    ///
    /// Pairs whose pool query fails or whose assets cannot be named are left out.
    pub fn reserve_snapshot(&self, venue: Venue) -> ClassifiedEvent {
        let mut reserves = BTreeMap::new();
        for (pair, address) in self.registry.pairs(venue).iter() {
            if RESERVE_EXCLUSIONS.contains(&pair) {
                continue;
            }
            let query = json!({ "pool": {} });
            let pool: PoolResponse = match query_contract(self.querier, address, &query) {
                Ok(pool) => pool,
                Err(e) => {
                    warn!(pair, "Pool query failed: {}", e);
                    continue;
                }
            };
            let [first, second] = match pool.assets.as_slice() {
                [first, second, ..] => [first, second],
                _ => {
                    debug!(pair, "Pool without two assets");
                    continue;
                }
            };
            let (Some(first_name), Some(second_name)) = (
                self.asset_name(venue, &first.info),
                self.asset_name(venue, &second.info),
            ) else {
                debug!(pair, "Pool asset not in catalogs");
                continue;
            };

            let legs = BTreeMap::from([
                (first_name.to_string(), first.amount.clone()),
                (second_name.to_string(), second.amount.clone()),
            ]);
            reserves.insert(pair.to_string(), legs);
        }

        ClassifiedEvent::new(
            Topic::update_reserve(venue),
            EventPayload::ReserveSnapshot(ReserveSnapshot(reserves)),
        )
    }

    /// Host-encoded account record of the terra operating wallet
    pub fn account_record(&self) -> Result<ClassifiedEvent, QueryError> {
        let wallet = self.wallet(WalletRole::TerraWallet)?;
        let record = self.querier.encoded_account(wallet)?;
        Ok(ClassifiedEvent::new(
            Topic::TerraAccount,
            EventPayload::AccountRecord(record),
        ))
    }

    /// Every snapshot that could be built
    pub fn snapshot_all(&self) -> Vec<ClassifiedEvent> {
        let mut events = Vec::new();
        let attempts = [
            ("account", self.account_snapshot()),
            ("contract", self.contract_snapshot()),
            ("rate", self.rate_snapshot()),
            ("account record", self.account_record()),
        ];
        for (name, result) in attempts {
            match result {
                Ok(event) => events.push(event),
                Err(e) => warn!("Skipping {} snapshot: {}", name, e),
            }
        }
        for venue in Venue::ALL {
            events.push(self.reserve_snapshot(venue));
        }
        events
    }

    fn wallet(&self, role: WalletRole) -> Result<&'a str, QueryError> {
        self.registry
            .wallets
            .address(role)
            .ok_or(QueryError::NotConfigured(role.key()))
    }

    fn token_balance(&self, token: &str, holder: &str) -> Result<String, QueryError> {
        let response: BalanceResponse =
            query_contract(self.querier, token, &json!({ "balance": { "address": holder } }))?;
        Ok(response.balance)
    }

    fn asset_name(&self, venue: Venue, info: &AssetInfo) -> Option<&'a str> {
        match info {
            AssetInfo::NativeToken { denom } => denom_symbol(denom),
            AssetInfo::Token { contract_addr } => self.registry.tokens(venue).asset_name(contract_addr),
        }
    }
}
