//! Factory-routed swaps. The routed message is forwarded opaquely.

use crate::event::{ClassifiedEvent, EventPayload, FactorySwap, Topic};
use crate::payload::{self, SendArgs};
use crate::registry::{AddressRegistry, WalletRole};

use super::{Call, Context, Outcome, Step};

/// Which factory a swap was routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryTag {
    Terra,
    Astro,
}

impl FactoryTag {
    pub fn label(&self) -> &'static str {
        match self {
            FactoryTag::Terra => "terra",
            FactoryTag::Astro => "astro",
        }
    }

    pub fn role(&self) -> WalletRole {
        match self {
            FactoryTag::Terra => WalletRole::TerraFactory,
            FactoryTag::Astro => WalletRole::AstroFactory,
        }
    }

    /// The factory at `address`, if it is one of ours
    pub fn of(registry: &AddressRegistry, address: &str) -> Option<Self> {
        [FactoryTag::Terra, FactoryTag::Astro]
            .into_iter()
            .find(|tag| registry.wallets.is(tag.role(), address))
    }
}

/// Classify a direct call to a factory contract
pub fn classify(ctx: &Context<'_>, tag: FactoryTag, call: &Call<'_>) -> Outcome {
    let amount = call.last_coin().map(|coin| coin.amount).unwrap_or(0);
    Outcome::Emitted(event(ctx, tag, payload::encode_base64(call.payload), amount))
}

/// Token `send` whose destination is a factory; the hook is forwarded still encoded
pub(crate) fn from_token_send(
    ctx: &Context<'_>,
    tag: FactoryTag,
    args: &SendArgs,
) -> Step<ClassifiedEvent> {
    let amount = payload::parse_amount(&args.amount).map_err(Outcome::from)?;
    let msg = args.msg.clone().unwrap_or_default();
    Ok(event(ctx, tag, msg, amount))
}

fn event(ctx: &Context<'_>, tag: FactoryTag, msg: String, amount: u128) -> ClassifiedEvent {
    ClassifiedEvent::new(
        Topic::FactorySwap,
        EventPayload::FactorySwap(FactorySwap {
            venue_tag: tag.label().to_string(),
            msg,
            amount,
            hash: ctx.hash,
        }),
    )
}
