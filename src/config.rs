//! Machine configuration.

use crate::model::Denomination;

/// Coins the machine accepts out of the box.
pub const DEFAULT_DENOMINATIONS: [Denomination; 7] = [1, 2, 5, 10, 20, 50, 100];

/// Coins of each denomination loaded at construction and after a collection.
pub const DEFAULT_COINS_PER_DENOMINATION: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub denominations: Vec<Denomination>,
    pub coins_per_denomination: u32,
}

impl MachineConfig {
    pub fn new(denominations: impl IntoIterator<Item = Denomination>, coins: u32) -> Self {
        Self {
            denominations: denominations.into_iter().collect(),
            coins_per_denomination: coins,
        }
    }

    /// Accepted denominations, ascending, deduplicated, zero dropped.
    pub fn normalized_denominations(&self) -> Vec<Denomination> {
        let mut denominations: Vec<_> = self
            .denominations
            .iter()
            .copied()
            .filter(|d| *d > 0)
            .collect();
        denominations.sort_unstable();
        denominations.dedup();
        denominations
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DENOMINATIONS, DEFAULT_COINS_PER_DENOMINATION)
    }
}
