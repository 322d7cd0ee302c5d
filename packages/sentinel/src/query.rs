//! Chain State Queries
//!
//! The host node's read-only view of ledger and contract state. Contract
//! queries are gas-metered on the host side; running out of gas surfaces as an
//! ordinary [`QueryError`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::payload;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown address: {0}")]
    UnknownAddress(String),

    #[error("Contract query failed: {0}")]
    Contract(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unparsable query response: {0}")]
    Response(String),

    #[error("{0} not configured")]
    NotConfigured(&'static str),
}

/// Host-supplied read-only state capability
#[cfg_attr(test, mockall::automock)]
pub trait StateQuerier: Send + Sync {
    /// Bank balance of `address` in `denom`
    fn bank_balance(&self, address: &str, denom: &str) -> Result<u128, QueryError>;

    /// Current account sequence of `address`
    fn account_sequence(&self, address: &str) -> Result<u64, QueryError>;

    /// Host encoding of the account record at `address`
    fn encoded_account(&self, address: &str) -> Result<Vec<u8>, QueryError>;

    /// Gas-metered smart query against `contract`; returns the raw JSON response
    fn smart_query(&self, contract: &str, query: &[u8]) -> Result<Vec<u8>, QueryError>;
}

/// Run a smart query with a JSON message and decode the response
pub fn query_contract<T: DeserializeOwned>(
    querier: &dyn StateQuerier,
    contract: &str,
    query: &Value,
) -> Result<T, QueryError> {
    let message = serde_json::to_vec(query).map_err(|e| QueryError::Contract(e.to_string()))?;
    let response = querier.smart_query(contract, &message)?;
    payload::decode(&response).map_err(|e| QueryError::Response(e.to_string()))
}
