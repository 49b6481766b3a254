//! User-selected mint quantity

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_MINT_QUANTITY, MIN_MINT_QUANTITY};

/// Quantity the user intends to mint, always within
/// `[MIN_MINT_QUANTITY, MAX_MINT_QUANTITY]`.
///
/// Every mutation clamps instead of failing, so a zero quantity can never
/// reach the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct MintSelection {
    quantity: u32,
}

impl MintSelection {
    /// Create a selection, clamping `quantity` into range
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity: quantity.clamp(MIN_MINT_QUANTITY, MAX_MINT_QUANTITY),
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Replace the quantity, clamping into range
    pub fn set(&mut self, quantity: u32) {
        *self = Self::new(quantity);
    }

    pub fn increment(&mut self) {
        self.set(self.quantity.saturating_add(1));
    }

    pub fn decrement(&mut self) {
        self.set(self.quantity.saturating_sub(1));
    }

    pub fn can_increment(&self) -> bool {
        self.quantity < MAX_MINT_QUANTITY
    }

    pub fn can_decrement(&self) -> bool {
        self.quantity > MIN_MINT_QUANTITY
    }

    /// Whether this selection goes through the single-unit entry point
    pub fn is_single(&self) -> bool {
        self.quantity == 1
    }
}

impl Default for MintSelection {
    fn default() -> Self {
        Self::new(MIN_MINT_QUANTITY)
    }
}

impl From<u32> for MintSelection {
    fn from(quantity: u32) -> Self {
        Self::new(quantity)
    }
}

impl From<MintSelection> for u32 {
    fn from(selection: MintSelection) -> Self {
        selection.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(MintSelection::new(0).quantity(), 1);
        assert_eq!(MintSelection::new(11).quantity(), 10);
        assert_eq!(MintSelection::new(u32::MAX).quantity(), 10);
        assert_eq!(MintSelection::new(7).quantity(), 7);
    }

    #[test]
    fn test_set_clamps() {
        let mut selection = MintSelection::default();
        selection.set(0);
        assert_eq!(selection.quantity(), 1);
        selection.set(11);
        assert_eq!(selection.quantity(), 10);
    }

    #[test]
    fn test_decrement_is_idempotent_at_floor() {
        let mut selection = MintSelection::new(2);
        selection.decrement();
        selection.decrement();
        selection.decrement();
        assert_eq!(selection.quantity(), 1);
        assert!(!selection.can_decrement());
        assert!(selection.can_increment());
    }

    #[test]
    fn test_increment_stops_at_ceiling() {
        let mut selection = MintSelection::new(9);
        selection.increment();
        selection.increment();
        assert_eq!(selection.quantity(), 10);
        assert!(!selection.can_increment());
    }

    #[test]
    fn test_deserialize_clamps() {
        let selection: MintSelection = serde_json::from_str("0").unwrap();
        assert_eq!(selection.quantity(), 1);
        let selection: MintSelection = serde_json::from_str("25").unwrap();
        assert_eq!(selection.quantity(), 10);
    }
}
