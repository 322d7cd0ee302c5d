//! Message Dispatch
//!
//! Decodes a raw transaction and routes each of its messages to the matching
//! classifiers by message kind and contract address. Routing precedence:
//!
//! 1. native transfers go to the bridge-receipt classifier
//! 2. calls sent by our own operating wallets are dropped
//! 3. the terra and astro factories, then the mint contract
//! 4. otherwise every venue whose pairs or tokens contain the contract, plus the
//!    hidden-mint path for the stable-yield wrapper token
//!
//! A call to the watched enemy contract additionally yields a bare sighting,
//! whatever the earlier steps decided.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::classify::factory::{self, FactoryTag};
use crate::classify::{mint, swap, transfer, Call, Context, Outcome, SkipReason};
use crate::event::{ClassifiedEvent, EventPayload, Sighting, Topic};
use crate::message::{DecodedMessage, TxDecoder, TxHash};
use crate::query::StateQuerier;
use crate::registry::{AddressRegistry, Venue, WalletRole};

/// Classifier a contract call is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Factory(FactoryTag),
    Mint,
    Venue(Venue),
    /// Mint notification hidden in a wrapper-token `send`
    HiddenMint,
}

/// Routes for a call to `contract`; empty when nothing applies
pub fn routes(registry: &AddressRegistry, contract: &str) -> Vec<Route> {
    if let Some(tag) = FactoryTag::of(registry, contract) {
        return vec![Route::Factory(tag)];
    }
    if registry.wallets.is(WalletRole::MintContract, contract) {
        return vec![Route::Mint];
    }

    let mut routes: Vec<Route> = Venue::ALL
        .into_iter()
        .filter(|venue| registry.is_venue_contract(*venue, contract))
        .map(Route::Venue)
        .collect();
    if registry.stable_yield_token() == Some(contract) {
        routes.push(Route::HiddenMint);
    }
    routes
}

/// Whether `sender` is one of the venues' operating wallets
pub fn is_self_generated(registry: &AddressRegistry, sender: &str) -> bool {
    Venue::ALL
        .into_iter()
        .any(|venue| registry.wallets.is(venue.operating_wallet(), sender))
}

/// Mempool transaction classifier
///
/// Holds the immutable registry and the host's decoder and state-query
/// capability. Safe to share across concurrent transaction checks.
#[derive(Clone)]
pub struct Classifier {
    registry: Arc<AddressRegistry>,
    decoder: Arc<dyn TxDecoder>,
    querier: Arc<dyn StateQuerier>,
}

impl Classifier {
    pub fn new(
        registry: Arc<AddressRegistry>,
        decoder: Arc<dyn TxDecoder>,
        querier: Arc<dyn StateQuerier>,
    ) -> Self {
        Self {
            registry,
            decoder,
            querier,
        }
    }

    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn querier(&self) -> &dyn StateQuerier {
        self.querier.as_ref()
    }

    /// Events produced by a raw transaction, in message order
    pub fn classify(&self, raw: &[u8]) -> Vec<ClassifiedEvent> {
        self.classify_outcomes(raw)
            .into_iter()
            .filter_map(Outcome::into_event)
            .collect()
    }

    /// Every classification outcome of a raw transaction, including drops
    ///
    /// An undecodable transaction yields no outcomes.
    pub fn classify_outcomes(&self, raw: &[u8]) -> Vec<Outcome> {
        let messages = match self.decoder.decode(raw) {
            Ok(messages) => messages,
            Err(e) => {
                trace!("Skipping undecodable transaction: {}", e);
                return Vec::new();
            }
        };

        let ctx = Context::new(&self.registry, self.querier.as_ref(), TxHash::of(raw));
        let mut outcomes = Vec::new();
        for message in &messages {
            self.dispatch(&ctx, message, &mut outcomes);
        }

        for outcome in &outcomes {
            match outcome {
                Outcome::Emitted(event) => debug!(hash = %ctx.hash, topic = %event.topic, "Classified"),
                Outcome::Skipped(reason) => trace!(hash = %ctx.hash, "Dropped: {}", reason),
                Outcome::QueryFailed(e) => debug!(hash = %ctx.hash, "State query failed: {}", e),
            }
        }
        outcomes
    }

    fn dispatch(&self, ctx: &Context<'_>, message: &DecodedMessage, outcomes: &mut Vec<Outcome>) {
        let (sender, contract, coins, payload) = match message {
            DecodedMessage::NativeTransfer { from, to, coins } => {
                outcomes.push(transfer::classify_native(ctx, from, to, coins));
                return;
            }
            DecodedMessage::ContractCall {
                sender,
                contract,
                coins,
                payload,
            } => (sender, contract, coins, payload),
        };
        let call = Call {
            sender,
            contract,
            coins,
            payload,
        };

        if is_self_generated(ctx.registry, sender) {
            outcomes.push(SkipReason::SelfGenerated.into());
        } else {
            let routes = routes(ctx.registry, contract);
            if routes.is_empty() {
                outcomes.push(SkipReason::NotRouted.into());
            }
            for route in routes {
                outcomes.push(match route {
                    Route::Factory(tag) => factory::classify(ctx, tag, &call),
                    Route::Mint => mint::classify(ctx, payload),
                    Route::Venue(venue) => swap::classify(ctx, venue, &call),
                    Route::HiddenMint => mint::classify_hidden(ctx, payload),
                });
            }
        }

        if ctx.registry.wallets.is(WalletRole::TerraEnemy, contract) {
            outcomes.push(Outcome::Emitted(ClassifiedEvent::new(
                Topic::TerraEnemy,
                EventPayload::Sighting(Sighting::bare(ctx.hash)),
            )));
        }
    }
}
