//! On-chain configuration and counters of the ClawdPFP contract

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{ClawdError, ClawdResult};

// ============================================================================
// Contract Snapshot
// ============================================================================

/// Fully known contract state.
///
/// Built only through [`ContractSnapshot::new`], which rejects a minted count
/// above a non-zero max supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    mint_price_wei: U256,
    burn_per_mint_wei: U256,
    total_minted: U256,
    total_burned: U256,
    treasury_balance_wei: U256,
    /// Zero means unlimited
    max_supply: U256,
    mint_active: bool,
    owner: Address,
}

impl ContractSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mint_price_wei: U256,
        burn_per_mint_wei: U256,
        total_minted: U256,
        total_burned: U256,
        treasury_balance_wei: U256,
        max_supply: U256,
        mint_active: bool,
        owner: Address,
    ) -> ClawdResult<Self> {
        if !max_supply.is_zero() && total_minted > max_supply {
            return Err(ClawdError::inconsistent_snapshot(&format!(
                "total minted {} exceeds max supply {}",
                total_minted, max_supply
            )));
        }

        Ok(Self {
            mint_price_wei,
            burn_per_mint_wei,
            total_minted,
            total_burned,
            treasury_balance_wei,
            max_supply,
            mint_active,
            owner,
        })
    }

    pub fn mint_price_wei(&self) -> U256 {
        self.mint_price_wei
    }

    pub fn burn_per_mint_wei(&self) -> U256 {
        self.burn_per_mint_wei
    }

    pub fn total_minted(&self) -> U256 {
        self.total_minted
    }

    pub fn total_burned(&self) -> U256 {
        self.total_burned
    }

    pub fn treasury_balance_wei(&self) -> U256 {
        self.treasury_balance_wei
    }

    pub fn max_supply(&self) -> U256 {
        self.max_supply
    }

    pub fn mint_active(&self) -> bool {
        self.mint_active
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn remaining_supply(&self) -> RemainingSupply {
        RemainingSupply::from_counts(Some(self.max_supply), Some(self.total_minted))
    }
}

// ============================================================================
// Partial Snapshot
// ============================================================================

/// Contract state as currently known; each field is read independently and
/// may be absent (never read, or unreadable mid chain switch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSnapshot {
    pub mint_price_wei: Option<U256>,
    pub burn_per_mint_wei: Option<U256>,
    pub total_minted: Option<U256>,
    pub total_burned: Option<U256>,
    pub treasury_balance_wei: Option<U256>,
    pub max_supply: Option<U256>,
    pub mint_active: Option<bool>,
    pub owner: Option<Address>,
}

impl PartialSnapshot {
    /// Whether a mint price has been read
    pub fn mint_price_known(&self) -> bool {
        self.mint_price_wei.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.mint_price_wei.is_some()
            && self.burn_per_mint_wei.is_some()
            && self.total_minted.is_some()
            && self.total_burned.is_some()
            && self.treasury_balance_wei.is_some()
            && self.max_supply.is_some()
            && self.mint_active.is_some()
            && self.owner.is_some()
    }

    /// Promote to a [`ContractSnapshot`] once every field is known
    pub fn complete(&self) -> ClawdResult<ContractSnapshot> {
        ContractSnapshot::new(
            require(self.mint_price_wei, "mintPrice")?,
            require(self.burn_per_mint_wei, "burnAmountPerMint")?,
            require(self.total_minted, "totalMinted")?,
            require(self.total_burned, "totalClawdBurned")?,
            require(self.treasury_balance_wei, "clawdTreasury")?,
            require(self.max_supply, "maxSupply")?,
            require(self.mint_active, "mintActive")?,
            require(self.owner, "owner")?,
        )
    }

    pub fn remaining_supply(&self) -> RemainingSupply {
        RemainingSupply::from_counts(self.max_supply, self.total_minted)
    }
}

impl From<&ContractSnapshot> for PartialSnapshot {
    fn from(snapshot: &ContractSnapshot) -> Self {
        Self {
            mint_price_wei: Some(snapshot.mint_price_wei),
            burn_per_mint_wei: Some(snapshot.burn_per_mint_wei),
            total_minted: Some(snapshot.total_minted),
            total_burned: Some(snapshot.total_burned),
            treasury_balance_wei: Some(snapshot.treasury_balance_wei),
            max_supply: Some(snapshot.max_supply),
            mint_active: Some(snapshot.mint_active),
            owner: Some(snapshot.owner),
        }
    }
}

fn require<T>(value: Option<T>, field: &str) -> ClawdResult<T> {
    value.ok_or_else(|| ClawdError::field_unknown(field))
}

// ============================================================================
// Remaining Supply
// ============================================================================

/// NFTs left to mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingSupply {
    /// Max supply or minted count not yet read
    Unknown,
    /// Max supply is zero
    Unlimited,
    Limited(U256),
}

impl RemainingSupply {
    pub fn from_counts(max_supply: Option<U256>, total_minted: Option<U256>) -> Self {
        match (max_supply, total_minted) {
            (Some(max), _) if max.is_zero() => Self::Unlimited,
            (Some(max), Some(minted)) => Self::Limited(max.saturating_sub(minted)),
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for RemainingSupply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "—"),
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(left) => write!(f, "{}", left),
        }
    }
}
