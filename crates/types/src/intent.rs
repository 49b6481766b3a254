//! Derived cost of a mint request

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::units::wei_to_tokens;

/// Total payment and burn for the current selection, with USD equivalents.
///
/// Always derived from a snapshot, the price feeds and a selection; never
/// stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MintIntent {
    pub total_cost_wei: U256,
    pub total_burn_wei: U256,
    pub total_cost_usd: f64,
    pub total_burn_usd: f64,
}

impl MintIntent {
    /// Total native payment in whole ETH
    pub fn total_cost_eth(&self) -> f64 {
        wei_to_tokens(self.total_cost_wei)
    }

    /// Total burn in whole CLAWD
    pub fn total_burn_tokens(&self) -> f64 {
        wei_to_tokens(self.total_burn_wei)
    }
}
