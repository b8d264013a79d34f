use crate::Amount;
use crate::engine::CoinReserve;
use crate::model::{Collection, Report};

/// Profit accounting against the reserve value captured at start-up.
#[derive(Debug, Clone, Copy)]
pub struct Ledger {
    baseline: Amount,
}

impl Ledger {
    /// Capture the baseline from a freshly stocked reserve.
    pub fn new(reserve: &CoinReserve) -> Self {
        Self {
            baseline: reserve.total_value(),
        }
    }

    pub fn baseline(&self) -> Amount {
        self.baseline
    }

    pub fn total_in_reserve(&self, reserve: &CoinReserve) -> Amount {
        reserve.total_value()
    }

    /// Negative when change shortfalls have drained the float below baseline.
    pub fn profit(&self, reserve: &CoinReserve) -> Amount {
        self.total_in_reserve(reserve) - self.baseline
    }

    pub fn report(&self, reserve: &CoinReserve) -> Report {
        Report {
            total: self.total_in_reserve(reserve),
            profit: self.profit(reserve),
        }
    }

    /// Take the profit out by reloading the reserve to its initial stock.
    pub fn collect(&self, reserve: &mut CoinReserve) -> Collection {
        let profit = self.profit(reserve);
        if !profit.is_positive() {
            return Collection::NoProfit(profit);
        }
        reserve.reset_to_baseline_stock();
        Collection::Collected(profit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(value: i64) -> Amount {
        Amount::from_units(value)
    }

    #[test]
    fn fresh_machine_has_no_profit() {
        let reserve = CoinReserve::default();
        let ledger = Ledger::new(&reserve);
        assert_eq!(ledger.baseline(), units(1880));
        assert_eq!(
            ledger.report(&reserve),
            Report {
                total: units(1880),
                profit: Amount::ZERO
            }
        );
    }

    #[test]
    fn collect_resets_reserve_and_keeps_baseline() {
        let mut reserve = CoinReserve::default();
        let ledger = Ledger::new(&reserve);
        reserve.deposit(100).unwrap();
        reserve.deposit(20).unwrap();
        assert_eq!(ledger.profit(&reserve), units(120));

        assert_eq!(ledger.collect(&mut reserve), Collection::Collected(units(120)));
        assert_eq!(reserve.total_value(), units(1880));
        assert_eq!(ledger.baseline(), units(1880));
        assert_eq!(ledger.collect(&mut reserve), Collection::NoProfit(Amount::ZERO));
    }

    #[test]
    fn negative_profit_is_reported_not_collected() {
        let mut reserve = CoinReserve::default();
        let ledger = Ledger::new(&reserve);
        reserve.dispense(units(30));
        assert_eq!(ledger.profit(&reserve), units(-30));
        assert_eq!(ledger.collect(&mut reserve), Collection::NoProfit(units(-30)));
        assert_eq!(reserve.total_value(), units(1850));
    }
}
