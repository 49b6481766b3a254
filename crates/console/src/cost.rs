//! Mint cost breakdown
//!
//! Pure functions; the caller decides when inputs changed and recomputes.

use alloy_primitives::U256;
use clawd_types::{wei_to_tokens, MintIntent, MintSelection, PartialSnapshot};

/// Compute the total payment and burn for `selection`.
///
/// An unknown mint price yields an all-zero intent so the console renders a
/// zero cost instead of failing. An unknown burn amount counts as zero burn.
pub fn cost(
    mint_price_wei: Option<U256>,
    burn_per_mint_wei: Option<U256>,
    selection: MintSelection,
    eth_usd: f64,
    burn_token_usd: f64,
) -> MintIntent {
    let Some(mint_price_wei) = mint_price_wei else {
        return MintIntent::default();
    };

    let quantity = U256::from(selection.quantity());
    let total_cost_wei = mint_price_wei.saturating_mul(quantity);
    let total_burn_wei = burn_per_mint_wei
        .unwrap_or(U256::ZERO)
        .saturating_mul(quantity);

    MintIntent {
        total_cost_wei,
        total_burn_wei,
        total_cost_usd: wei_to_tokens(total_cost_wei) * eth_usd,
        total_burn_usd: wei_to_tokens(total_burn_wei) * burn_token_usd,
    }
}

/// [`cost`] fed from the latest snapshot
pub fn cost_for_snapshot(
    snapshot: &PartialSnapshot,
    selection: MintSelection,
    eth_usd: f64,
    burn_token_usd: f64,
) -> MintIntent {
    cost(
        snapshot.mint_price_wei,
        snapshot.burn_per_mint_wei,
        selection,
        eth_usd,
        burn_token_usd,
    )
}
