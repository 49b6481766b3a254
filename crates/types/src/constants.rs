/// Constants shared across the mint console

use std::time::Duration;

// ============================================================================
// Token Constants
// ============================================================================

/// Decimal exponent for ETH and CLAWD base units
pub const TOKEN_DECIMALS: u8 = 18;

/// One whole token expressed in base units (10^18)
pub const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// CLAWD token on Base
pub const CLAWD_TOKEN_ADDRESS: &str = "0x9f86dB9fc6f7c9408e8Fda3Ff8ce4e78ac7a6b07";

/// Wrapped ETH on Base, used to price the native currency
pub const BASE_WETH_ADDRESS: &str = "0x4200000000000000000000000000000000000006";

// ============================================================================
// Network Constants
// ============================================================================

/// Base mainnet chain id
pub const BASE_CHAIN_ID: u64 = 8453;

/// Display name of the target network
pub const BASE_NETWORK_NAME: &str = "Base";

/// Native currency symbol on the target network
pub const NATIVE_SYMBOL: &str = "ETH";

// ============================================================================
// Mint Selection Constants
// ============================================================================

/// Smallest quantity a single mint request may carry
pub const MIN_MINT_QUANTITY: u32 = 1;

/// Largest quantity a single mint request may carry
pub const MAX_MINT_QUANTITY: u32 = 10;

// ============================================================================
// Polling Constants
// ============================================================================

/// Interval between USD price fetches
pub const PRICE_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default interval between contract state refreshes (roughly one Base block batch)
pub const CONTRACT_POLL_INTERVAL: Duration = Duration::from_secs(12);

/// Default interval between receipt polls while awaiting confirmation
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// DexScreener token endpoint
pub const DEXSCREENER_TOKENS_ENDPOINT: &str = "https://api.dexscreener.com/latest/dex/tokens";

// ============================================================================
// Gallery Constants
// ============================================================================

/// Placeholder tile colours for the collection preview
pub const PFP_COLORS: [&str; 20] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7",
    "#DDA0DD", "#FF7F50", "#87CEEB", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F1948A", "#82E0AA", "#F8C471",
    "#D2B4DE", "#AED6F1", "#F5B7B1", "#A9DFBF", "#FAD7A0",
];
