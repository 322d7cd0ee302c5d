//! Classified Events
//!
//! Everything the pipeline publishes: the topic enumeration, the payload shapes
//! the downstream trading system reads, and their MessagePack encoding.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::message::TxHash;
use crate::registry::Venue;

/// Publication topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    MirrorReceiveShuttle,
    MirrorEnemy,
    MirrorSwapStart,
    TerraEnemy,
    TerraSwapStart,
    FactorySwap,
    MirrorUpdateAccount,
    TerraUpdateAccount,
    AncRate,
    MirrorUpdateReserve,
    TerraUpdateReserve,
    TerraAccount,
}

impl Topic {
    pub const ALL: [Topic; 12] = [
        Topic::MirrorReceiveShuttle,
        Topic::MirrorEnemy,
        Topic::MirrorSwapStart,
        Topic::TerraEnemy,
        Topic::TerraSwapStart,
        Topic::FactorySwap,
        Topic::MirrorUpdateAccount,
        Topic::TerraUpdateAccount,
        Topic::AncRate,
        Topic::MirrorUpdateReserve,
        Topic::TerraUpdateReserve,
        Topic::TerraAccount,
    ];

    /// Topic label sent as the first frame
    pub fn label(&self) -> &'static str {
        match self {
            Topic::MirrorReceiveShuttle => "mirrorReceiveShuttle",
            Topic::MirrorEnemy => "mirrorEnemy",
            Topic::MirrorSwapStart => "mirrorSwapStart",
            Topic::TerraEnemy => "terraEnemy",
            Topic::TerraSwapStart => "terraSwapStart",
            Topic::FactorySwap => "factorySwap",
            Topic::MirrorUpdateAccount => "mirrorUpdateAccount",
            Topic::TerraUpdateAccount => "terraUpdateAccount",
            Topic::AncRate => "ancRate",
            Topic::MirrorUpdateReserve => "mirrorUpdateReserve",
            Topic::TerraUpdateReserve => "terraUpdateReserve",
            Topic::TerraAccount => "TerraAccount",
        }
    }

    pub fn swap_start(venue: Venue) -> Self {
        match venue {
            Venue::Terra => Topic::TerraSwapStart,
            Venue::Mirror => Topic::MirrorSwapStart,
        }
    }

    pub fn enemy(venue: Venue) -> Self {
        match venue {
            Venue::Terra => Topic::TerraEnemy,
            Venue::Mirror => Topic::MirrorEnemy,
        }
    }

    /// Bridge receipts are only tracked into the mirror wallet
    pub fn receive_from_bridge(venue: Venue) -> Option<Self> {
        match venue {
            Venue::Terra => None,
            Venue::Mirror => Some(Topic::MirrorReceiveShuttle),
        }
    }

    pub fn update_reserve(venue: Venue) -> Self {
        match venue {
            Venue::Terra => Topic::TerraUpdateReserve,
            Venue::Mirror => Topic::MirrorUpdateReserve,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Amounts go out as MessagePack integers; values beyond `u64` fall back to decimal text
fn wire_amount<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    match u64::try_from(*amount) {
        Ok(small) => serializer.serialize_u64(small),
        Err(_) => serializer.collect_str(amount),
    }
}

/// How a swap intent was reconstructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Normal,
    Mint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapData {
    pub pair_name: String,
    pub asset_in: String,
    #[serde(serialize_with = "wire_amount")]
    pub amount: u128,
    pub max_spread: Option<String>,
    pub price: Option<String>,
}

/// A pending swap (or mint sold into a pair) worth reacting to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapIntent {
    pub data: SwapData,
    #[serde(rename = "type")]
    pub kind: IntentKind,
    pub hash: TxHash,
}

/// Activity of a watched counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sighting {
    #[serde(rename = "assetName", skip_serializing_if = "Option::is_none")]
    pub pair_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<IntentKind>,
    pub hash: TxHash,
}

impl Sighting {
    /// Sighting of a watched contract: only the hash
    pub fn bare(hash: TxHash) -> Self {
        Self {
            pair_name: None,
            kind: None,
            hash,
        }
    }

    /// Enemy swap on a known pair
    pub fn on_pair(pair_name: impl Into<String>, hash: TxHash) -> Self {
        Self {
            pair_name: Some(pair_name.into()),
            kind: Some(IntentKind::Normal),
            hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorySwap {
    #[serde(rename = "type")]
    pub venue_tag: String,
    /// Base64 of the routed message, never interpreted here
    pub msg: String,
    #[serde(serialize_with = "wire_amount")]
    pub amount: u128,
    pub hash: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeReceive {
    #[serde(rename = "assetName")]
    pub asset_name: String,
    #[serde(serialize_with = "wire_amount")]
    pub amount: u128,
    #[serde(rename = "type")]
    pub kind: IntentKind,
    pub hash: TxHash,
}

/// Operating wallet balances by asset symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub balance: BTreeMap<String, String>,
    pub sequence: u64,
    #[serde(rename = "AUST")]
    pub aust: String,
}

/// Balance held by the execution contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractSnapshot {
    pub balance: String,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    #[serde(rename = "ancRate")]
    pub anc_rate: f64,
}

/// Pair name → asset symbol → reserve amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReserveSnapshot(pub BTreeMap<String, BTreeMap<String, String>>);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    SwapIntent(SwapIntent),
    Sighting(Sighting),
    FactorySwap(FactorySwap),
    BridgeReceive(BridgeReceive),
    AccountSnapshot(AccountSnapshot),
    ContractSnapshot(ContractSnapshot),
    RateSnapshot(RateSnapshot),
    ReserveSnapshot(ReserveSnapshot),
    /// Host-encoded account record, forwarded as is
    #[serde(skip)]
    AccountRecord(Vec<u8>),
}

/// A topic plus payload, ready for publication
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    pub topic: Topic,
    pub payload: EventPayload,
}

impl ClassifiedEvent {
    pub fn new(topic: Topic, payload: EventPayload) -> Self {
        Self { topic, payload }
    }

    /// Hash of the originating transaction; snapshots have none
    pub fn tx_hash(&self) -> Option<TxHash> {
        match &self.payload {
            EventPayload::SwapIntent(p) => Some(p.hash),
            EventPayload::Sighting(p) => Some(p.hash),
            EventPayload::FactorySwap(p) => Some(p.hash),
            EventPayload::BridgeReceive(p) => Some(p.hash),
            _ => None,
        }
    }

    /// Serialize the payload frame
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        match &self.payload {
            EventPayload::AccountRecord(bytes) => Ok(bytes.clone()),
            payload => rmp_serde::to_vec_named(payload),
        }
    }
}
