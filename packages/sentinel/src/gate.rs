//! Balance Gate
//!
//! Decides whether a reconstructed swap is economically executable by checking
//! the sender actually holds the offered amount right now.

use serde_json::json;
use tracing::{trace, warn};

use crate::message::symbol_denom;
use crate::payload::{self, BalanceResponse};
use crate::query::{query_contract, QueryError, StateQuerier};
use crate::registry::{AddressRegistry, Venue};

/// Result of a sufficiency check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sufficiency {
    Sufficient,
    Insufficient { balance: u128, required: u128 },
    Unavailable(QueryError),
}

impl Sufficiency {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Sufficiency::Sufficient)
    }
}

pub struct BalanceGate<'a> {
    registry: &'a AddressRegistry,
    querier: &'a dyn StateQuerier,
}

impl<'a> BalanceGate<'a> {
    pub fn new(registry: &'a AddressRegistry, querier: &'a dyn StateQuerier) -> Self {
        Self { registry, querier }
    }

    /// `true` only when `sender` demonstrably holds at least `required` of `asset`
    pub fn check_sufficient(&self, asset: &str, sender: &str, required: u128) -> bool {
        self.sufficiency(asset, sender, required).is_sufficient()
    }

    pub fn sufficiency(&self, asset: &str, sender: &str, required: u128) -> Sufficiency {
        match self.balance_of(asset, sender) {
            Ok(balance) if balance >= required => Sufficiency::Sufficient,
            Ok(balance) => {
                trace!(asset, sender, balance, required, "Balance below swap amount");
                Sufficiency::Insufficient { balance, required }
            }
            Err(e) => {
                warn!(asset, sender, "Balance check failed: {}", e);
                Sufficiency::Unavailable(e)
            }
        }
    }

    /// Native symbols read the bank ledger; everything else is a token balance query
    fn balance_of(&self, asset: &str, sender: &str) -> Result<u128, QueryError> {
        if let Some(denom) = symbol_denom(asset) {
            return self.querier.bank_balance(sender, denom);
        }

        let contract = self
            .registry
            .tokens(Venue::Mirror)
            .address(asset)
            .or_else(|| self.registry.tokens(Venue::Terra).address(asset))
            .ok_or_else(|| QueryError::UnknownAddress(asset.to_string()))?;

        let response: BalanceResponse = query_contract(
            self.querier,
            contract,
            &json!({ "balance": { "address": sender } }),
        )?;
        payload::parse_amount(&response.balance).map_err(|e| QueryError::Response(e.to_string()))
    }
}
