//! Transaction Messages
//!
//! The decoded form of a pending transaction as handed over by the host, the
//! transaction hash, and a decoder for JSON-encoded Cosmos transactions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur during transaction decoding
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Empty transaction bytes")]
    EmptyInput,

    #[error("Malformed transaction: {0}")]
    Malformed(String),
}

/// SHA-256 digest of the full raw transaction
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Hash raw transaction bytes the way the node reports transaction hashes
    pub fn of(raw: &[u8]) -> Self {
        Self(Sha256::digest(raw).into())
    }

    /// Upper-case hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.to_hex())
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// A native coin attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(deserialize_with = "amount_from_string")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

/// Map a native denomination to its symbol; only `uusd` and `uluna` are recognized
pub fn denom_symbol(denom: &str) -> Option<&'static str> {
    match denom {
        "uusd" => Some("UST"),
        "uluna" => Some("LUNA"),
        _ => None,
    }
}

/// Inverse of [`denom_symbol`]
pub fn symbol_denom(symbol: &str) -> Option<&'static str> {
    match symbol {
        "UST" => Some("uusd"),
        "LUNA" => Some("uluna"),
        _ => None,
    }
}

/// Cosmos amounts are decimal strings on the wire; accept bare numbers as well
fn amount_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Number(n) => Ok(n as u128),
    }
}

/// One message of a decoded transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMessage {
    /// Bank send of native coins
    NativeTransfer {
        from: String,
        to: String,
        coins: Vec<Coin>,
    },
    /// Smart contract execution; `payload` is the JSON execute message
    ContractCall {
        sender: String,
        contract: String,
        coins: Vec<Coin>,
        payload: Vec<u8>,
    },
}

/// Host-supplied transaction decoder
pub trait TxDecoder: Send + Sync {
    /// Turn raw transaction bytes into its ordered messages
    fn decode(&self, raw: &[u8]) -> Result<Vec<DecodedMessage>, DecodeError>;
}

/// Decoder for JSON-encoded Cosmos transactions
///
/// Reads `body.messages[]`, keyed by `@type`. Message types other than bank
/// sends and wasm executions are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonTxDecoder;

#[derive(Deserialize)]
struct JsonTx {
    body: JsonBody,
}

#[derive(Deserialize)]
struct JsonBody {
    #[serde(default)]
    messages: Vec<JsonMsg>,
}

#[derive(Deserialize)]
#[serde(tag = "@type")]
enum JsonMsg {
    #[serde(rename = "/cosmos.bank.v1beta1.MsgSend")]
    Send {
        from_address: String,
        to_address: String,
        #[serde(default)]
        amount: Vec<Coin>,
    },
    #[serde(
        rename = "/terra.wasm.v1beta1.MsgExecuteContract",
        alias = "/cosmwasm.wasm.v1.MsgExecuteContract"
    )]
    Execute {
        sender: String,
        contract: String,
        #[serde(alias = "msg")]
        execute_msg: serde_json::Value,
        #[serde(default, alias = "funds")]
        coins: Vec<Coin>,
    },
    #[serde(other)]
    Other,
}

impl TxDecoder for JsonTxDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Vec<DecodedMessage>, DecodeError> {
        if raw.is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let tx: JsonTx =
            serde_json::from_slice(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let mut messages = Vec::with_capacity(tx.body.messages.len());
        for msg in tx.body.messages {
            match msg {
                JsonMsg::Send {
                    from_address,
                    to_address,
                    amount,
                } => messages.push(DecodedMessage::NativeTransfer {
                    from: from_address,
                    to: to_address,
                    coins: amount,
                }),
                JsonMsg::Execute {
                    sender,
                    contract,
                    execute_msg,
                    coins,
                } => {
                    let payload = serde_json::to_vec(&execute_msg)
                        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
                    messages.push(DecodedMessage::ContractCall {
                        sender,
                        contract,
                        coins,
                        payload,
                    });
                }
                JsonMsg::Other => {}
            }
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== TxHash tests ====================

    #[test]
    fn test_tx_hash_is_sha256_upper_hex() {
        let hash = TxHash::of(b"abc");
        assert_eq!(
            hash.to_hex(),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
        assert_eq!(hash.to_string().len(), 64);
    }

    #[test]
    fn test_tx_hash_serializes_as_string() {
        let hash = TxHash::of(b"abc");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
    }

    // ==================== denom tests ====================

    #[test]
    fn test_denom_symbol_recognizes_two_denoms() {
        assert_eq!(denom_symbol("uusd"), Some("UST"));
        assert_eq!(denom_symbol("uluna"), Some("LUNA"));
        assert_eq!(denom_symbol("ukrw"), None);
        assert_eq!(symbol_denom("UST"), Some("uusd"));
        assert_eq!(symbol_denom("MIR"), None);
    }

    #[test]
    fn test_coin_amount_from_string_or_number() {
        let coin: Coin = serde_json::from_str(r#"{"denom":"uusd","amount":"1000"}"#).unwrap();
        assert_eq!(coin, Coin::new("uusd", 1000));
        let coin: Coin = serde_json::from_str(r#"{"denom":"uusd","amount":7}"#).unwrap();
        assert_eq!(coin.amount, 7);
        assert!(serde_json::from_str::<Coin>(r#"{"denom":"uusd","amount":"1.5"}"#).is_err());
    }

    // ==================== JsonTxDecoder tests ====================

    #[test]
    fn test_decode_empty_input() {
        assert!(matches!(JsonTxDecoder.decode(&[]), Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn test_decode_malformed_input() {
        assert!(matches!(
            JsonTxDecoder.decode(b"not a tx"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_bank_send_and_execute_in_order() {
        let raw = br#"{"body":{"messages":[
            {"@type":"/cosmos.bank.v1beta1.MsgSend","from_address":"terra1a","to_address":"terra1b",
             "amount":[{"denom":"uluna","amount":"5"}]},
            {"@type":"/terra.wasm.v1beta1.MsgExecuteContract","sender":"terra1s","contract":"terra1c",
             "execute_msg":{"swap":{}},"coins":[{"denom":"uusd","amount":"10"}]}
        ]}}"#;

        let messages = JsonTxDecoder.decode(raw).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            DecodedMessage::NativeTransfer {
                from: "terra1a".into(),
                to: "terra1b".into(),
                coins: vec![Coin::new("uluna", 5)],
            }
        );
        match &messages[1] {
            DecodedMessage::ContractCall {
                sender,
                contract,
                coins,
                payload,
            } => {
                assert_eq!(sender, "terra1s");
                assert_eq!(contract, "terra1c");
                assert_eq!(coins, &vec![Coin::new("uusd", 10)]);
                assert_eq!(payload, br#"{"swap":{}}"#);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_execute_payload_keeps_sender_key_order() {
        let raw = br#"{"body":{"messages":[
            {"@type":"/terra.wasm.v1beta1.MsgExecuteContract","sender":"terra1s","contract":"terra1c",
             "execute_msg":{"swap":{"offer_asset":{"info":{"native_token":{"denom":"uusd"}},"amount":"5"},"max_spread":"0.01","belief_price":"2"}},
             "coins":[]}
        ]}}"#;

        match &JsonTxDecoder.decode(raw).unwrap()[0] {
            DecodedMessage::ContractCall { payload, .. } => assert_eq!(
                payload,
                br#"{"swap":{"offer_asset":{"info":{"native_token":{"denom":"uusd"}},"amount":"5"},"max_spread":"0.01","belief_price":"2"}}"#
            ),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_decode_skips_unknown_message_types() {
        let raw = br#"{"body":{"messages":[
            {"@type":"/cosmos.staking.v1beta1.MsgDelegate","delegator_address":"terra1a"}
        ]}}"#;
        assert!(JsonTxDecoder.decode(raw).unwrap().is_empty());
    }
}
