//! Native bank transfers from the bridge into the mirror wallet.

use crate::event::{BridgeReceive, ClassifiedEvent, EventPayload, IntentKind, Topic};
use crate::message::{denom_symbol, Coin};
use crate::registry::WalletRole;

use super::{finish, Context, Outcome, SkipReason, Step};

/// Classify a native `MsgSend`
pub fn classify_native(ctx: &Context<'_>, from: &str, to: &str, coins: &[Coin]) -> Outcome {
    finish(receive(ctx, from, to, coins))
}

fn receive(ctx: &Context<'_>, from: &str, to: &str, coins: &[Coin]) -> Step<ClassifiedEvent> {
    let wallets = &ctx.registry.wallets;
    if !wallets.is(WalletRole::Shuttle, from) || !wallets.is(WalletRole::MirrorWallet, to) {
        return Err(SkipReason::UntrackedTransfer.into());
    }

    // Only the last coin is reported
    let coin = coins.last().ok_or(SkipReason::NoCoins)?;
    let asset_name =
        denom_symbol(&coin.denom).ok_or_else(|| SkipReason::UnknownDenom(coin.denom.clone()))?;

    Ok(ClassifiedEvent::new(
        Topic::MirrorReceiveShuttle,
        EventPayload::BridgeReceive(BridgeReceive {
            asset_name: asset_name.to_string(),
            amount: coin.amount,
            kind: IntentKind::Normal,
            hash: ctx.hash,
        }),
    ))
}
