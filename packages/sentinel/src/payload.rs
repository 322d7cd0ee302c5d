//! Contract Payload Schemas
//!
//! Typed views of the execute messages and query responses the classifiers
//! understand. Each payload is decoded against the schema of the call kind the
//! dispatcher routed it to; anything that does not fit is a [`PayloadError`].

use base64ct::{Base64, Encoding};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Payload does not match schema: {0}")]
    Schema(String),

    #[error("Invalid base64 in nested message")]
    Base64,

    #[error("Invalid integer amount: {0}")]
    Amount(String),

    #[error("Invalid decimal: {0}")]
    Decimal(String),
}

/// Decode a JSON payload into a typed schema
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PayloadError> {
    serde_json::from_slice(bytes).map_err(|e| PayloadError::Schema(e.to_string()))
}

/// Decode a base64 string carrying a nested JSON message
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, PayloadError> {
    Base64::decode_vec(encoded).map_err(|_| PayloadError::Base64)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    Base64::encode_string(bytes)
}

/// Parse a decimal-string integer amount such as `"1000000"`
pub fn parse_amount(text: &str) -> Result<u128, PayloadError> {
    text.trim()
        .parse()
        .map_err(|_| PayloadError::Amount(text.to_string()))
}

pub fn parse_decimal(text: &str) -> Result<Decimal, PayloadError> {
    Decimal::from_str(text.trim()).map_err(|_| PayloadError::Decimal(text.to_string()))
}

// ==================== Pair / token execute messages ====================

/// Execute message sent to a pair or token contract; exactly one top-level key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairCall {
    Swap(SwapArgs),
    Send(SendArgs),
    Transfer(TransferArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwapArgs {
    #[serde(default)]
    pub belief_price: Option<String>,
    #[serde(default)]
    pub max_spread: Option<String>,
}

/// Token `send`: move tokens to `contract` and invoke its hook with `msg`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendArgs {
    pub contract: String,
    pub amount: String,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferArgs {
    pub recipient: String,
    pub amount: String,
}

/// Hook carried base64-encoded inside a token `send` toward a pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwapHook {
    pub swap: SwapArgs,
}

impl SwapHook {
    pub fn from_base64(encoded: &str) -> Result<Self, PayloadError> {
        decode(&decode_base64(encoded)?)
    }
}

/// Token `send` wrapper whose hook may hide another call
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenSend {
    pub send: SendArgs,
}

// ==================== Mint ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetInfo {
    Token { contract_addr: String },
    NativeToken { denom: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    pub info: AssetInfo,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenPosition {
    pub collateral: Asset,
    pub asset_info: AssetInfo,
    pub collateral_ratio: String,
}

/// Mint-contract execute message; only `open_position` is of interest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MintCall {
    #[serde(default)]
    pub open_position: Option<OpenPosition>,
}

// ==================== Query responses ====================

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balance: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceResponse {
    pub rate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpochStateResponse {
    pub exchange_rate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolResponse {
    pub assets: Vec<Asset>,
}
