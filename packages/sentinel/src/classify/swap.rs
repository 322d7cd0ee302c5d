//! Pair and token calls on a venue: `swap`, `send` and bridge `transfer`.

use crate::event::{
    BridgeReceive, ClassifiedEvent, EventPayload, IntentKind, Sighting, SwapData, SwapIntent, Topic,
};
use crate::gate::Sufficiency;
use crate::message::denom_symbol;
use crate::payload::{self, PairCall, SendArgs, SwapArgs, SwapHook, TransferArgs};
use crate::registry::{Venue, WalletRole};

use super::factory::{self, FactoryTag};
use super::{finish, Call, Context, Outcome, SkipReason, Step};

/// Classify a call to one of `venue`'s pair or token contracts
pub fn classify(ctx: &Context<'_>, venue: Venue, call: &Call<'_>) -> Outcome {
    let step = payload::decode::<PairCall>(call.payload)
        .map_err(Outcome::from)
        .and_then(|decoded| match decoded {
            PairCall::Swap(args) => swap(ctx, venue, call, args),
            PairCall::Send(args) => send(ctx, venue, call, args),
            PairCall::Transfer(args) => transfer(ctx, venue, call, args),
        });
    finish(step)
}

fn swap(ctx: &Context<'_>, venue: Venue, call: &Call<'_>, args: SwapArgs) -> Step<ClassifiedEvent> {
    let pair_name = ctx
        .registry
        .pairs(venue)
        .asset_name(call.contract)
        .ok_or_else(|| SkipReason::UnresolvedContract(call.contract.to_string()))?;

    if let Some(sighting) = enemy_sighting(ctx, venue, call.sender, pair_name) {
        return Ok(sighting);
    }

    let coin = call.last_coin().ok_or(SkipReason::NoCoins)?;
    let asset_in =
        denom_symbol(&coin.denom).ok_or_else(|| SkipReason::UnknownDenom(coin.denom.clone()))?;

    require_balance(ctx, asset_in, call.sender, coin.amount)?;

    Ok(swap_intent(
        ctx,
        venue,
        pair_name,
        asset_in,
        coin.amount,
        args.max_spread,
        args.belief_price,
    ))
}

fn send(ctx: &Context<'_>, venue: Venue, call: &Call<'_>, args: SendArgs) -> Step<ClassifiedEvent> {
    let Some(pair_name) = ctx.registry.pairs(venue).asset_name(&args.contract) else {
        // Tokens routed into a factory rather than a pair
        if let Some(tag) = FactoryTag::of(ctx.registry, &args.contract) {
            return factory::from_token_send(ctx, tag, &args);
        }
        return Err(SkipReason::UnresolvedContract(args.contract).into());
    };

    let asset = ctx
        .registry
        .tokens(venue)
        .asset_name(call.contract)
        .ok_or_else(|| SkipReason::UnresolvedContract(call.contract.to_string()))?;
    if !pair_name.contains(asset) {
        return Err(SkipReason::AssetNotInPair {
            pair: pair_name.to_string(),
            asset: asset.to_string(),
        }
        .into());
    }

    let amount = payload::parse_amount(&args.amount)?;

    if let Some(sighting) = enemy_sighting(ctx, venue, call.sender, pair_name) {
        return Ok(sighting);
    }

    let hook = SwapHook::from_base64(args.msg.as_deref().ok_or(SkipReason::MissingHook)?)?;

    require_balance(ctx, asset, call.sender, amount)?;

    Ok(swap_intent(
        ctx,
        venue,
        pair_name,
        asset,
        amount,
        hook.swap.max_spread,
        hook.swap.belief_price,
    ))
}

fn transfer(
    ctx: &Context<'_>,
    venue: Venue,
    call: &Call<'_>,
    args: TransferArgs,
) -> Step<ClassifiedEvent> {
    let wallets = &ctx.registry.wallets;
    if !wallets.is(WalletRole::Shuttle, call.sender) {
        return Err(SkipReason::UntrackedTransfer.into());
    }
    let topic = Topic::receive_from_bridge(venue).ok_or(SkipReason::NoBridgeTopic)?;

    let amount = payload::parse_amount(&args.amount)?;
    if !wallets.is(venue.operating_wallet(), &args.recipient) {
        return Err(SkipReason::WrongRecipient(args.recipient).into());
    }

    let asset_name = ctx
        .registry
        .tokens(venue)
        .asset_name(call.contract)
        .ok_or_else(|| SkipReason::UnresolvedContract(call.contract.to_string()))?;

    Ok(ClassifiedEvent::new(
        topic,
        EventPayload::BridgeReceive(BridgeReceive {
            asset_name: asset_name.to_string(),
            amount,
            kind: IntentKind::Normal,
            hash: ctx.hash,
        }),
    ))
}

/// Reduced event for a swap by the venue's watched counterparty
fn enemy_sighting(
    ctx: &Context<'_>,
    venue: Venue,
    sender: &str,
    pair_name: &str,
) -> Option<ClassifiedEvent> {
    if !ctx.registry.wallets.is(venue.enemy_wallet(), sender) {
        return None;
    }
    Some(ClassifiedEvent::new(
        Topic::enemy(venue),
        EventPayload::Sighting(Sighting::on_pair(pair_name, ctx.hash)),
    ))
}

fn require_balance(ctx: &Context<'_>, asset: &str, sender: &str, amount: u128) -> Step<()> {
    match ctx.gate().sufficiency(asset, sender, amount) {
        Sufficiency::Sufficient => Ok(()),
        Sufficiency::Insufficient { balance, required } => {
            Err(SkipReason::InsufficientBalance { balance, required }.into())
        }
        Sufficiency::Unavailable(e) => Err(e.into()),
    }
}

fn swap_intent(
    ctx: &Context<'_>,
    venue: Venue,
    pair_name: &str,
    asset_in: &str,
    amount: u128,
    max_spread: Option<String>,
    price: Option<String>,
) -> ClassifiedEvent {
    ClassifiedEvent::new(
        Topic::swap_start(venue),
        EventPayload::SwapIntent(SwapIntent {
            data: SwapData {
                pair_name: pair_name.to_string(),
                asset_in: asset_in.to_string(),
                amount,
                max_spread,
                price,
            },
            kind: IntentKind::Normal,
            hash: ctx.hash,
        }),
    )
}
