//! Shared fixtures: an in-memory chain, a recording sink and transaction builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use mempool_sentinel::publisher::EventSink;
use mempool_sentinel::query::{QueryError, StateQuerier};
use mempool_sentinel::registry::AddressRegistry;
use mempool_sentinel::{ClassifiedEvent, Classifier, JsonTxDecoder};

pub const TRADER: &str = "terra1trader";
pub const MIRROR_WALLET: &str = "terra1mirrorwallet";
pub const TERRA_WALLET: &str = "terra1terrawallet";
pub const TERRA_CONTRACT: &str = "terra1executor";
pub const TERRA_FACTORY: &str = "terra1terrafactory";
pub const ASTRO_FACTORY: &str = "terra1astrofactory";
pub const MINT_CONTRACT: &str = "terra1mint";
pub const TERRA_ENEMY: &str = "terra1watchedcontract";
pub const MIRROR_ENEMY: &str = "terra1mirrorenemy";
pub const SHUTTLE: &str = "terra1shuttle";
pub const ANC_MARKET: &str = "terra1ancmarket";
pub const MIRROR_ORACLE: &str = "terra1mirrororacle";

pub const LUNA_PAIR: &str = "terra1lunaustpair";
pub const BLUNA_PAIR: &str = "terra1blunapair";
pub const AUST: &str = "terra1aust";
pub const MIR_PAIR: &str = "terra1mirustpair";
pub const MAAPL_PAIR: &str = "terra1maaplustpair";
pub const MIR: &str = "terra1mirtoken";
pub const MAAPL: &str = "terra1maapltoken";

/// Registry with one or two pairs per venue and every wallet role configured
pub fn registry() -> AddressRegistry {
    let mut registry = AddressRegistry::default();
    registry.terra_pairs.insert("LUNA-UST", LUNA_PAIR);
    registry.terra_pairs.insert("BLUNA-NLUNA", BLUNA_PAIR);
    registry.terra_tokens.insert("AUST", AUST);
    registry.mirror_pairs.insert("MIR-UST", MIR_PAIR);
    registry.mirror_pairs.insert("mAAPL-UST", MAAPL_PAIR);
    registry.mirror_tokens.insert("MIR", MIR);
    registry.mirror_tokens.insert("mAAPL", MAAPL);
    for (name, address) in [
        ("mirrorWallet", MIRROR_WALLET),
        ("terraWallet", TERRA_WALLET),
        ("terraContract", TERRA_CONTRACT),
        ("terraFactory", TERRA_FACTORY),
        ("astroFactory", ASTRO_FACTORY),
        ("mintContract", MINT_CONTRACT),
        ("terraEnemy", TERRA_ENEMY),
        ("mirrorEnemy", MIRROR_ENEMY),
        ("shuttle", SHUTTLE),
        ("ancContract", ANC_MARKET),
        ("mirrorOracle", MIRROR_ORACLE),
    ] {
        registry.wallets.insert(name, address);
    }
    registry
}

/// In-memory ledger and contract state
#[derive(Debug, Default)]
pub struct FakeChain {
    bank: HashMap<(String, String), u128>,
    tokens: HashMap<(String, String), String>,
    prices: HashMap<String, String>,
    pools: HashMap<String, Value>,
    sequences: HashMap<String, u64>,
    accounts: HashMap<String, Vec<u8>>,
    exchange_rate: Option<String>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bank(mut self, address: &str, denom: &str, amount: u128) -> Self {
        self.bank.insert((address.to_string(), denom.to_string()), amount);
        self
    }

    pub fn with_token(mut self, token: &str, holder: &str, amount: &str) -> Self {
        self.tokens
            .insert((token.to_string(), holder.to_string()), amount.to_string());
        self
    }

    pub fn with_price(mut self, asset: &str, price: &str) -> Self {
        self.prices.insert(asset.to_string(), price.to_string());
        self
    }

    pub fn with_exchange_rate(mut self, rate: &str) -> Self {
        self.exchange_rate = Some(rate.to_string());
        self
    }

    pub fn with_pool(mut self, pair: &str, assets: Value) -> Self {
        self.pools
            .insert(pair.to_string(), json!({ "assets": assets, "total_share": "1000" }));
        self
    }

    pub fn with_sequence(mut self, address: &str, sequence: u64) -> Self {
        self.sequences.insert(address.to_string(), sequence);
        self
    }

    pub fn with_account(mut self, address: &str, record: &[u8]) -> Self {
        self.accounts.insert(address.to_string(), record.to_vec());
        self
    }

    fn answer(&self, contract: &str, query: &Value) -> Result<Value, QueryError> {
        let missing = || QueryError::Contract(format!("no state for {} at {}", query, contract));
        if let Some(holder) = query["balance"]["address"].as_str() {
            let balance = self
                .tokens
                .get(&(contract.to_string(), holder.to_string()))
                .cloned()
                .unwrap_or_else(|| "0".to_string());
            return Ok(json!({ "balance": balance }));
        }
        if contract == MIRROR_ORACLE {
            let base = query["price"]["base_asset"].as_str().unwrap_or_default();
            let rate = self.prices.get(base).ok_or_else(missing)?;
            return Ok(json!({ "rate": rate, "last_updated_base": 0, "last_updated_quote": 0 }));
        }
        if contract == ANC_MARKET {
            let rate = self.exchange_rate.as_ref().ok_or_else(missing)?;
            return Ok(json!({ "exchange_rate": rate, "aterra_supply": "1" }));
        }
        if query.get("pool").is_some() {
            return self.pools.get(contract).cloned().ok_or_else(missing);
        }
        Err(missing())
    }
}

impl StateQuerier for FakeChain {
    fn bank_balance(&self, address: &str, denom: &str) -> Result<u128, QueryError> {
        Ok(self
            .bank
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0))
    }

    fn account_sequence(&self, address: &str) -> Result<u64, QueryError> {
        self.sequences
            .get(address)
            .copied()
            .ok_or_else(|| QueryError::UnknownAddress(address.to_string()))
    }

    fn encoded_account(&self, address: &str) -> Result<Vec<u8>, QueryError> {
        self.accounts
            .get(address)
            .cloned()
            .ok_or_else(|| QueryError::UnknownAddress(address.to_string()))
    }

    fn smart_query(&self, contract: &str, query: &[u8]) -> Result<Vec<u8>, QueryError> {
        let query: Value =
            serde_json::from_slice(query).map_err(|e| QueryError::Contract(e.to_string()))?;
        let answer = self.answer(contract, &query)?;
        serde_json::to_vec(&answer).map_err(|e| QueryError::Store(e.to_string()))
    }
}

/// Sink that keeps every published event
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ClassifiedEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ClassifiedEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &ClassifiedEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn classifier(registry: AddressRegistry, chain: FakeChain) -> Classifier {
    Classifier::new(Arc::new(registry), Arc::new(JsonTxDecoder), Arc::new(chain))
}

// ==================== Transaction builders ====================

pub fn tx(messages: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({ "body": { "messages": messages, "memo": "" } })).unwrap()
}

pub fn execute(sender: &str, contract: &str, msg: Value, coins: Value) -> Value {
    json!({
        "@type": "/terra.wasm.v1beta1.MsgExecuteContract",
        "sender": sender,
        "contract": contract,
        "execute_msg": msg,
        "coins": coins,
    })
}

pub fn bank_send(from: &str, to: &str, coins: Value) -> Value {
    json!({
        "@type": "/cosmos.bank.v1beta1.MsgSend",
        "from_address": from,
        "to_address": to,
        "amount": coins,
    })
}

pub fn coins(denom: &str, amount: u128) -> Value {
    json!([{ "denom": denom, "amount": amount.to_string() }])
}

pub fn base64(msg: &Value) -> String {
    mempool_sentinel::payload::encode_base64(&serde_json::to_vec(msg).unwrap())
}

/// Decode a published MessagePack frame into JSON
pub fn wire(event: &ClassifiedEvent) -> Value {
    rmp_serde::from_slice(&event.encode().unwrap()).unwrap()
}
