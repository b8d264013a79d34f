use std::collections::BTreeMap;

use crate::Amount;
use crate::config::MachineConfig;
use crate::engine::DepositError;
use crate::model::{Change, Denomination};

/// The physical coins held by the machine, per denomination.
#[derive(Debug, Clone)]
pub struct CoinReserve {
    coins: BTreeMap<Denomination, u32>,
    initial_count: u32,
}

impl CoinReserve {
    /// Stock every configured denomination with the configured coin count.
    pub fn new(config: &MachineConfig) -> Self {
        let coins = config
            .normalized_denominations()
            .into_iter()
            .map(|d| (d, config.coins_per_denomination))
            .collect();
        Self {
            coins,
            initial_count: config.coins_per_denomination,
        }
    }

    /// Accept one coin.
    pub fn deposit(&mut self, denomination: Denomination) -> Result<(), DepositError> {
        let count = self
            .coins
            .get_mut(&denomination)
            .ok_or(DepositError::UnsupportedDenomination(denomination))?;
        *count += 1;
        Ok(())
    }

    /// Hand out `amount` greedily, largest denomination first.
    ///
    /// Not an optimal change solver: once a large coin is taken it is never
    /// given back, so a depleted small denomination can leave a remainder even
    /// when another combination would have worked.
    pub fn dispense(&mut self, amount: Amount) -> Change {
        let mut remaining = amount;
        let mut coins = Vec::new();

        for (&denomination, count) in self.coins.iter_mut().rev() {
            let value = Amount::from(denomination);
            while remaining >= value && *count > 0 {
                remaining -= value;
                *count -= 1;
                coins.push(denomination);
            }
        }

        Change {
            requested: amount,
            coins,
            remainder: remaining.max(Amount::ZERO),
        }
    }

    pub fn total_value(&self) -> Amount {
        self.coins
            .iter()
            .map(|(&denomination, &count)| Amount::of_coins(denomination, count))
            .sum()
    }

    /// Empty the reserve and reload the initial coin count per denomination.
    pub fn reset_to_baseline_stock(&mut self) {
        for count in self.coins.values_mut() {
            *count = self.initial_count;
        }
    }

    pub fn count(&self, denomination: Denomination) -> Option<u32> {
        self.coins.get(&denomination).copied()
    }

    /// Accepted denominations, ascending.
    pub fn denominations(&self) -> impl Iterator<Item = Denomination> + '_ {
        self.coins.keys().copied()
    }

    #[cfg(test)]
    pub(crate) fn set_count(&mut self, denomination: Denomination, count: u32) {
        if let Some(c) = self.coins.get_mut(&denomination) {
            *c = count;
        }
    }
}

impl Default for CoinReserve {
    fn default() -> Self {
        Self::new(&MachineConfig::default())
    }
}
