//! Console rendering
//!
//! Builds a plain view model from the latest state and prints it as text.
//! Nothing here performs I/O or holds state between builds.

use std::fmt;

use alloy_primitives::{Address, U256};
use clawd_types::{
    wei_to_tokens, MintSelection, PartialSnapshot, PriceFeedState, RemainingSupply,
    CLAWD_TOKEN_ADDRESS, PFP_COLORS,
};

use crate::cost::cost_for_snapshot;
use crate::orchestrator::{ActionLabels, OrchestratorState, PrimaryAction};

// ============================================================================
// Number Formatting
// ============================================================================

/// `$1,234.56`
pub fn format_usd(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u128;
    format!("{}${}.{:02}", sign, group_thousands(&(cents / 100).to_string()), cents % 100)
}

/// Whole token units with thousands separators
pub fn format_tokens(amount: f64) -> String {
    group_thousands(&format!("{:.0}", amount.max(0.0)))
}

/// Native amount with four decimals
pub fn format_native(amount: f64, symbol: &str) -> String {
    format!("{:.4} {}", amount, symbol)
}

/// Integer counts with thousands separators
pub fn format_count(value: U256) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

// ============================================================================
// View Model
// ============================================================================

/// Names and identifiers shown by the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLabels {
    pub action: ActionLabels,
    pub burn_symbol: String,
    pub burn_token: String,
    pub contract_address: Option<Address>,
}

impl Default for DisplayLabels {
    fn default() -> Self {
        Self {
            action: ActionLabels::default(),
            burn_symbol: "CLAWD".to_string(),
            burn_token: CLAWD_TOKEN_ADDRESS.to_string(),
            contract_address: None,
        }
    }
}

/// Everything a render reads
#[derive(Debug, Clone)]
pub struct ViewInputs<'a> {
    pub snapshot: &'a PartialSnapshot,
    pub native_price: &'a PriceFeedState,
    pub burn_token_price: &'a PriceFeedState,
    pub selection: MintSelection,
    pub state: OrchestratorState,
    pub connected_address: Option<Address>,
    pub labels: &'a DisplayLabels,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    pub total_minted: String,
    pub supply_note: String,
    pub burned: String,
    pub burned_usd: String,
    pub treasury: String,
    pub treasury_usd: String,
    pub remaining: RemainingSupply,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MintCardView {
    pub burn_per_mint: String,
    pub burn_per_mint_usd: Option<String>,
    pub quantity: u32,
    pub can_decrement: bool,
    pub can_increment: bool,
    pub total_cost: String,
    pub total_cost_usd: Option<String>,
    pub total_burn: String,
    pub total_burn_usd: Option<String>,
    pub action: PrimaryAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryTile {
    pub number: usize,
    pub color: &'static str,
    pub minted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HowItWorksView {
    pub mint_price: String,
    pub mint_price_usd: Option<String>,
    pub burn_per_mint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInfoView {
    pub contract: Option<Address>,
    pub owner: Option<Address>,
    pub burn_token: String,
    pub is_owner: bool,
}

/// Full console screen
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleView {
    pub stats: StatsView,
    pub mint: MintCardView,
    pub gallery: Vec<GalleryTile>,
    pub how_it_works: HowItWorksView,
    pub contract_info: ContractInfoView,
    burn_symbol: String,
}

impl ConsoleView {
    pub fn build(inputs: &ViewInputs<'_>) -> Self {
        let snapshot = inputs.snapshot;
        let labels = inputs.labels;
        let native_priced = inputs.native_price.has_price();
        let burn_priced = inputs.burn_token_price.has_price();
        let native_usd = inputs.native_price.usd_price_per_token;
        let burn_usd = inputs.burn_token_price.usd_price_per_token;
        let symbol = labels.action.native_symbol.as_str();

        let tokens = |wei: Option<U256>| wei.map(wei_to_tokens).unwrap_or(0.0);
        let usd_if_priced = |amount: f64, priced: bool, price: f64| priced.then(|| format_usd(amount * price));

        let burned = tokens(snapshot.total_burned);
        let treasury = tokens(snapshot.treasury_balance_wei);
        let stats = StatsView {
            total_minted: snapshot.total_minted.map(format_count).unwrap_or_else(|| "0".to_string()),
            supply_note: match snapshot.max_supply {
                Some(max) if !max.is_zero() => format!("of {} max", format_count(max)),
                _ => "Unlimited supply".to_string(),
            },
            burned: format_tokens(burned),
            burned_usd: format_usd(burned * burn_usd),
            treasury: format_tokens(treasury),
            treasury_usd: format_usd(treasury * burn_usd),
            remaining: snapshot.remaining_supply(),
        };

        let intent = cost_for_snapshot(snapshot, inputs.selection, native_usd, burn_usd);
        let burn_per_mint = tokens(snapshot.burn_per_mint_wei);
        let mint = MintCardView {
            burn_per_mint: format_tokens(burn_per_mint),
            burn_per_mint_usd: usd_if_priced(burn_per_mint, burn_priced, burn_usd),
            quantity: inputs.selection.quantity(),
            can_decrement: inputs.selection.can_decrement(),
            can_increment: inputs.selection.can_increment(),
            total_cost: format_native(intent.total_cost_eth(), symbol),
            total_cost_usd: native_priced.then(|| format_usd(intent.total_cost_usd)),
            total_burn: format_tokens(intent.total_burn_tokens()),
            total_burn_usd: burn_priced.then(|| format_usd(intent.total_burn_usd)),
            action: PrimaryAction::for_state(inputs.state, inputs.selection, &intent, &labels.action),
        };

        let gallery = PFP_COLORS
            .into_iter()
            .enumerate()
            .map(|(index, color)| GalleryTile {
                number: index + 1,
                color,
                minted: snapshot
                    .total_minted
                    .map(|minted| U256::from(index) < minted)
                    .unwrap_or(false),
            })
            .collect();

        let mint_price = tokens(snapshot.mint_price_wei);
        let how_it_works = HowItWorksView {
            mint_price: format_native(mint_price, symbol),
            mint_price_usd: usd_if_priced(mint_price, native_priced, native_usd),
            burn_per_mint: format_tokens(burn_per_mint),
        };

        let contract_info = ContractInfoView {
            contract: labels.contract_address,
            owner: snapshot.owner,
            burn_token: labels.burn_token.clone(),
            is_owner: is_owner(inputs.connected_address, snapshot.owner),
        };

        Self {
            stats,
            mint,
            gallery,
            how_it_works,
            contract_info,
            burn_symbol: labels.burn_symbol.clone(),
        }
    }
}

/// Addresses compare by value, so checksum casing never matters
pub fn is_owner(connected: Option<Address>, owner: Option<Address>) -> bool {
    matches!((connected, owner), (Some(connected), Some(owner)) if connected == owner)
}

impl fmt::Display for ConsoleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = &self.burn_symbol;
        let stats = &self.stats;

        writeln!(f, "== Collection ==")?;
        writeln!(f, "  Total Minted     {} ({})", stats.total_minted, stats.supply_note)?;
        writeln!(f, "  {} Burned     {} ({})", symbol, stats.burned, stats.burned_usd)?;
        writeln!(f, "  Burn Treasury    {} {} ({})", stats.treasury, symbol, stats.treasury_usd)?;
        writeln!(f, "  Remaining        {}", stats.remaining)?;

        let mint = &self.mint;
        writeln!(f)?;
        writeln!(f, "== Mint ==")?;
        write!(f, "  Burn per mint    {} {}", mint.burn_per_mint, symbol)?;
        match &mint.burn_per_mint_usd {
            Some(usd) => writeln!(f, " (~{})", usd)?,
            None => writeln!(f)?,
        }
        writeln!(
            f,
            "  Quantity         {}{}{}",
            if mint.can_decrement { "[-] " } else { "    " },
            mint.quantity,
            if mint.can_increment { " [+]" } else { "" }
        )?;
        write!(f, "  Cost             {}", mint.total_cost)?;
        match &mint.total_cost_usd {
            Some(usd) => writeln!(f, " (~{})", usd)?,
            None => writeln!(f)?,
        }
        write!(f, "  {} burned     {}", symbol, mint.total_burn)?;
        match &mint.total_burn_usd {
            Some(usd) => writeln!(f, " (~{})", usd)?,
            None => writeln!(f)?,
        }
        writeln!(
            f,
            "  > {}{}",
            mint.action.label,
            if mint.action.enabled { "" } else { " (disabled)" }
        )?;

        writeln!(f)?;
        writeln!(f, "== Gallery ==")?;
        for row in self.gallery.chunks(5) {
            let tiles: Vec<String> = row
                .iter()
                .map(|tile| format!("#{:<2}{}", tile.number, if tile.minted { "*" } else { " " }))
                .collect();
            writeln!(f, "  {}", tiles.join("  "))?;
        }

        let how = &self.how_it_works;
        writeln!(f)?;
        writeln!(f, "== How it works ==")?;
        write!(f, "  1. Pay {}", how.mint_price)?;
        match &how.mint_price_usd {
            Some(usd) => writeln!(f, " (~{}) per PFP", usd)?,
            None => writeln!(f, " per PFP")?,
        }
        writeln!(f, "  2. {} {} is burned from the treasury", how.burn_per_mint, symbol)?;
        writeln!(f, "  3. Receive your PFP")?;

        let info = &self.contract_info;
        writeln!(f)?;
        writeln!(f, "== Contract ==")?;
        if let Some(contract) = &info.contract {
            writeln!(f, "  Contract         {}", contract.to_checksum(None))?;
        }
        match &info.owner {
            Some(owner) => writeln!(
                f,
                "  Owner            {}{}",
                short_address(owner),
                if info.is_owner { " [owner]" } else { "" }
            )?,
            None => writeln!(f, "  Owner            —")?,
        }
        writeln!(f, "  {} token      {}", symbol, info.burn_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clawd_types::tokens_to_wei;

    fn snapshot() -> PartialSnapshot {
        PartialSnapshot {
            mint_price_wei: Some(U256::from(10_000_000_000_000_000u128)),
            burn_per_mint_wei: Some(tokens_to_wei(1_000)),
            total_minted: Some(U256::from(3u64)),
            total_burned: Some(tokens_to_wei(1_234_567)),
            treasury_balance_wei: Some(tokens_to_wei(97_000)),
            max_supply: Some(U256::from(1_000u64)),
            mint_active: Some(true),
            owner: Some(Address::repeat_byte(0x11)),
        }
    }

    fn priced(price: f64) -> PriceFeedState {
        PriceFeedState::default().with_price(price, Utc::now())
    }

    fn build(snapshot: &PartialSnapshot, eth: f64, clawd: f64, connected: Option<Address>) -> ConsoleView {
        let labels = DisplayLabels::default();
        ConsoleView::build(&ViewInputs {
            snapshot,
            native_price: &priced(eth),
            burn_token_price: &priced(clawd),
            selection: MintSelection::new(3),
            state: OrchestratorState::ReadyToMint,
            connected_address: connected,
            labels: &labels,
        })
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_usd(1234.5678), "$1,234.57");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(90.0), "$90.00");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_tokens(1_234_567.4), "1,234,567");
        assert_eq!(format_tokens(999.0), "999");
        assert_eq!(format_native(0.03, "ETH"), "0.0300 ETH");
        assert_eq!(format_count(U256::from(10_000u64)), "10,000");
    }

    #[test]
    fn test_reference_mint_card() {
        let view = build(&snapshot(), 3000.0, 0.002, None);

        assert_eq!(view.mint.total_cost, "0.0300 ETH");
        assert_eq!(view.mint.total_cost_usd.as_deref(), Some("$90.00"));
        assert_eq!(view.mint.total_burn, "3,000");
        assert_eq!(view.mint.total_burn_usd.as_deref(), Some("$6.00"));
        assert_eq!(view.mint.burn_per_mint_usd.as_deref(), Some("$2.00"));
        assert_eq!(view.mint.action.label, "Mint 3 PFPs for 0.0300 ETH");
        assert_eq!(view.how_it_works.mint_price_usd.as_deref(), Some("$30.00"));
    }

    #[test]
    fn test_usd_hidden_without_prices() {
        let view = build(&snapshot(), 0.0, 0.0, None);
        assert!(view.mint.total_cost_usd.is_none());
        assert!(view.mint.total_burn_usd.is_none());
        assert!(view.mint.burn_per_mint_usd.is_none());
        assert_eq!(view.stats.burned_usd, "$0.00");
    }

    #[test]
    fn test_stats() {
        let view = build(&snapshot(), 3000.0, 0.002, None);
        assert_eq!(view.stats.total_minted, "3");
        assert_eq!(view.stats.supply_note, "of 1,000 max");
        assert_eq!(view.stats.burned, "1,234,567");
        assert_eq!(view.stats.remaining.to_string(), "997");

        let mut unlimited = snapshot();
        unlimited.max_supply = Some(U256::ZERO);
        let view = build(&unlimited, 3000.0, 0.002, None);
        assert_eq!(view.stats.supply_note, "Unlimited supply");
        assert_eq!(view.stats.remaining.to_string(), "unlimited");

        let view = build(&PartialSnapshot::default(), 3000.0, 0.002, None);
        assert_eq!(view.stats.total_minted, "0");
        assert_eq!(view.stats.remaining.to_string(), "—");
        assert_eq!(view.mint.total_cost, "0.0000 ETH");
    }

    #[test]
    fn test_gallery_marks_minted_tiles() {
        let view = build(&snapshot(), 3000.0, 0.002, None);
        assert_eq!(view.gallery.len(), 20);
        assert_eq!(view.gallery[0].number, 1);
        assert_eq!(view.gallery[0].color, PFP_COLORS[0]);
        assert!(view.gallery[2].minted);
        assert!(!view.gallery[3].minted);
    }

    #[test]
    fn test_owner_badge_ignores_case() {
        let lower: Address = "0x9f86db9fc6f7c9408e8fda3ff8ce4e78ac7a6b07".parse().unwrap();
        let checksummed: Address = "0x9f86dB9fc6f7c9408e8Fda3Ff8ce4e78ac7a6b07".parse().unwrap();

        let mut owned = snapshot();
        owned.owner = Some(checksummed);
        assert!(build(&owned, 0.0, 0.0, Some(lower)).contract_info.is_owner);
        assert!(!build(&owned, 0.0, 0.0, Some(Address::repeat_byte(0x22))).contract_info.is_owner);
        assert!(!build(&owned, 0.0, 0.0, None).contract_info.is_owner);
        assert!(!is_owner(Some(lower), None));
    }

    #[test]
    fn test_render_text() {
        let rendered = build(&snapshot(), 3000.0, 0.002, Some(Address::repeat_byte(0x11))).to_string();
        assert!(rendered.contains("Mint 3 PFPs for 0.0300 ETH"));
        assert!(rendered.contains("(~$90.00)"));
        assert!(rendered.contains("[owner]"));
        assert!(rendered.contains("#20"));
    }
}
