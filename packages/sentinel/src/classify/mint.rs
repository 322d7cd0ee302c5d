//! Mint position classification.
//!
//! An `open_position` call locks collateral and mints an mAsset that is usually
//! sold straight into its pair. The minted amount is estimated from the
//! collateral value and the minted asset's oracle price.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::event::{ClassifiedEvent, EventPayload, IntentKind, SwapData, SwapIntent, Topic};
use crate::payload::{self, AssetInfo, MintCall, OpenPosition, TokenSend};

use super::{finish, Context, Outcome, SkipReason, Step};

/// Slippage and price reported for mint intents
const MINT_QUOTE: &str = "1";

/// Classify a mint-contract execute message
pub fn classify(ctx: &Context<'_>, payload: &[u8]) -> Outcome {
    let step = payload::decode::<MintCall>(payload)
        .map_err(Outcome::from)
        .and_then(|call| call.open_position.ok_or(SkipReason::NotOpenPosition.into()))
        .and_then(|position| open_position(ctx, position));
    finish(step)
}

/// Classify a mint hidden in a wrapper-token `send` hook
pub fn classify_hidden(ctx: &Context<'_>, payload: &[u8]) -> Outcome {
    let step = payload::decode::<TokenSend>(payload)
        .map_err(Outcome::from)
        .and_then(|wrapper| wrapper.send.msg.ok_or(SkipReason::MissingHook.into()))
        .and_then(|hook| payload::decode_base64(&hook).map_err(Outcome::from));
    match step {
        Ok(inner) => classify(ctx, &inner),
        Err(outcome) => outcome,
    }
}

fn open_position(ctx: &Context<'_>, position: OpenPosition) -> Step<ClassifiedEvent> {
    let ratio = payload::parse_decimal(&position.collateral_ratio)?;

    let minted_address = match &position.asset_info {
        AssetInfo::Token { contract_addr } => contract_addr.as_str(),
        AssetInfo::NativeToken { denom } => {
            return Err(SkipReason::UnresolvedContract(denom.clone()).into())
        }
    };
    let minted_asset = ctx
        .registry
        .mirror_tokens
        .asset_name(minted_address)
        .ok_or_else(|| SkipReason::UnresolvedContract(minted_address.to_string()))?;

    let collateral = payload::parse_decimal(&position.collateral.amount)?;
    if ratio.is_zero() {
        return Err(SkipReason::ZeroCollateralRatio.into());
    }
    let multiplier = match &position.collateral.info {
        AssetInfo::Token { contract_addr } => collateral_multiplier(ctx, contract_addr)?,
        AssetInfo::NativeToken { .. } => Decimal::ONE,
    };

    let price = ctx.oracle().price(minted_address)?;
    if price.is_zero() {
        return Err(SkipReason::ZeroPrice.into());
    }

    // amount * multiplier / (ratio * price), divided once
    let amount = collateral
        .checked_mul(multiplier)
        .zip(ratio.checked_mul(price))
        .and_then(|(value, divisor)| value.checked_div(divisor))
        .map(|minted| minted.floor())
        .and_then(|minted| minted.to_u128())
        .ok_or(SkipReason::OutOfRange)?;

    Ok(ClassifiedEvent::new(
        Topic::MirrorSwapStart,
        EventPayload::SwapIntent(SwapIntent {
            data: SwapData {
                pair_name: minted_asset.to_string(),
                asset_in: minted_asset.to_string(),
                amount,
                max_spread: Some(MINT_QUOTE.to_string()),
                price: Some(MINT_QUOTE.to_string()),
            },
            kind: IntentKind::Mint,
            hash: ctx.hash,
        }),
    ))
}

/// UST value of one unit of token collateral
fn collateral_multiplier(ctx: &Context<'_>, token: &str) -> Step<Decimal> {
    if ctx.registry.stable_yield_token() == Some(token) {
        return Ok(ctx.oracle().exchange_rate()?);
    }
    if ctx.registry.mirror_tokens.contains_address(token) {
        return Ok(ctx.oracle().price(token)?);
    }
    Err(SkipReason::UnresolvedContract(token.to_string()).into())
}
