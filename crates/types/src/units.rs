//! Conversion between base units and human-scale decimals

use alloy_primitives::U256;

use crate::constants::WEI_PER_TOKEN;

/// Convert a base-unit amount to a human-scale decimal using `decimals`.
///
/// Amounts above `u128::MAX` whole units saturate; display precision is all
/// that is needed here.
pub fn to_decimal(amount: U256, decimals: u8) -> f64 {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let (whole, fraction) = amount.div_rem(scale);
    let whole: u128 = whole.saturating_to();
    let fraction: u128 = fraction.saturating_to();
    whole as f64 + fraction as f64 / 10f64.powi(decimals as i32)
}

/// Convert an 18-decimal base-unit amount to whole tokens
pub fn wei_to_tokens(amount: U256) -> f64 {
    to_decimal(amount, crate::constants::TOKEN_DECIMALS)
}

/// Whole tokens to base units, for fixtures and config defaults
pub fn tokens_to_wei(tokens: u128) -> U256 {
    U256::from(tokens).saturating_mul(U256::from(WEI_PER_TOKEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_fraction() {
        let amount = U256::from(10_000_000_000_000_000u128); // 0.01
        assert!((wei_to_tokens(amount) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_to_decimal_whole_and_fraction() {
        let amount = U256::from(1_500_000_000_000_000_000u128);
        assert!((wei_to_tokens(amount) - 1.5).abs() < 1e-12);
        assert_eq!(wei_to_tokens(U256::ZERO), 0.0);
    }

    #[test]
    fn test_other_decimals() {
        assert!((to_decimal(U256::from(1_234_567u64), 6) - 1.234567).abs() < 1e-9);
    }

    #[test]
    fn test_tokens_to_wei() {
        assert_eq!(tokens_to_wei(1_000), U256::from(1_000u128 * WEI_PER_TOKEN));
    }
}
