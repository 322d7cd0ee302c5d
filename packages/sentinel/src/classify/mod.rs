//! Payload Classifiers
//!
//! Each classifier looks at one decoded message and produces exactly one
//! [`Outcome`]: an event, a skip with its reason, or a failed state query.
//! Nothing in here can fail the host's transaction check.

pub mod factory;
pub mod mint;
pub mod swap;
pub mod transfer;

use thiserror::Error;

use crate::event::ClassifiedEvent;
use crate::gate::BalanceGate;
use crate::message::{Coin, TxHash};
use crate::oracle::PriceOracleClient;
use crate::payload::PayloadError;
use crate::query::{QueryError, StateQuerier};
use crate::registry::AddressRegistry;

/// Why a message produced no event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("no classifier applies")]
    NotRouted,

    #[error("sent by one of our own wallets")]
    SelfGenerated,

    #[error("transfer not from the bridge into a tracked wallet")]
    UntrackedTransfer,

    #[error("undecodable payload: {0}")]
    Decode(#[from] PayloadError),

    #[error("no coins attached")]
    NoCoins,

    #[error("unrecognized denomination {0}")]
    UnknownDenom(String),

    #[error("contract {0} not in catalogs")]
    UnresolvedContract(String),

    #[error("pair {pair} does not trade {asset}")]
    AssetNotInPair { pair: String, asset: String },

    #[error("send without hook message")]
    MissingHook,

    #[error("balance {balance} below {required}")]
    InsufficientBalance { balance: u128, required: u128 },

    #[error("recipient {0} is not the receiving wallet")]
    WrongRecipient(String),

    #[error("bridge receipts not tracked for this venue")]
    NoBridgeTopic,

    #[error("not an open_position call")]
    NotOpenPosition,

    #[error("zero collateral ratio")]
    ZeroCollateralRatio,

    #[error("zero oracle price")]
    ZeroPrice,

    #[error("amount out of range")]
    OutOfRange,
}

/// Result of classifying one message
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Emitted(ClassifiedEvent),
    Skipped(SkipReason),
    QueryFailed(QueryError),
}

impl Outcome {
    pub fn event(&self) -> Option<&ClassifiedEvent> {
        match self {
            Outcome::Emitted(event) => Some(event),
            _ => None,
        }
    }

    pub fn into_event(self) -> Option<ClassifiedEvent> {
        match self {
            Outcome::Emitted(event) => Some(event),
            _ => None,
        }
    }

    pub fn is_emitted(&self) -> bool {
        matches!(self, Outcome::Emitted(_))
    }
}

impl From<SkipReason> for Outcome {
    fn from(reason: SkipReason) -> Self {
        Outcome::Skipped(reason)
    }
}

impl From<PayloadError> for Outcome {
    fn from(e: PayloadError) -> Self {
        Outcome::Skipped(SkipReason::Decode(e))
    }
}

impl From<QueryError> for Outcome {
    fn from(e: QueryError) -> Self {
        Outcome::QueryFailed(e)
    }
}

/// Intermediate classification result; the error side is the final non-event outcome
pub(crate) type Step<T> = Result<T, Outcome>;

pub(crate) fn finish(step: Step<ClassifiedEvent>) -> Outcome {
    match step {
        Ok(event) => Outcome::Emitted(event),
        Err(outcome) => outcome,
    }
}

/// Everything a classifier may consult for one transaction
pub struct Context<'a> {
    pub registry: &'a AddressRegistry,
    pub querier: &'a dyn StateQuerier,
    pub hash: TxHash,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a AddressRegistry, querier: &'a dyn StateQuerier, hash: TxHash) -> Self {
        Self {
            registry,
            querier,
            hash,
        }
    }

    pub fn gate(&self) -> BalanceGate<'a> {
        BalanceGate::new(self.registry, self.querier)
    }

    pub fn oracle(&self) -> PriceOracleClient<'a> {
        PriceOracleClient::new(self.registry, self.querier)
    }
}

/// A contract call borrowed from its decoded message
#[derive(Debug, Clone, Copy)]
pub struct Call<'m> {
    pub sender: &'m str,
    pub contract: &'m str,
    pub coins: &'m [Coin],
    pub payload: &'m [u8],
}

impl<'m> Call<'m> {
    /// Attached coins are examined in order; the last one wins
    pub fn last_coin(&self) -> Option<&'m Coin> {
        self.coins.last()
    }
}
