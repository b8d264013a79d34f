//! Dispenser transaction engine.
//!
//! The engine owns the customer balance, the item catalog and the coin
//! reserve. It supports coin deposits, purchases with greedy change, refunds,
//! restocking and profit collection.

use tracing::{info, warn};

use crate::Amount;
use crate::config::MachineConfig;
use crate::model::{
    Change, Collection, Command, Denomination, Listing, Outcome, Refund, Report, Restock, Sale,
};

mod catalog;
pub use catalog::Catalog;

mod ledger;
pub use ledger::Ledger;

mod reserve;
pub use reserve::CoinReserve;

mod error;
pub use error::{CatalogError, DepositError, EngineError, PurchaseError, RestockError};

/// The dispenser engine.
///
/// Balance, catalog and reserve are one consistency domain: every operation
/// takes `&mut self` and runs to completion.
pub struct Engine {
    /// Money staged by the current customer
    balance: Amount,
    catalog: Catalog,
    reserve: CoinReserve,
    ledger: Ledger,
}

/// Public API
impl Engine {
    pub fn new() -> Self {
        Self::with_config(&MachineConfig::default())
    }

    pub fn with_config(config: &MachineConfig) -> Self {
        let reserve = CoinReserve::new(config);
        let ledger = Ledger::new(&reserve);
        Self {
            balance: Amount::ZERO,
            catalog: Catalog::new(),
            reserve,
            ledger,
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list(&self) -> Vec<Listing> {
        self.catalog.list()
    }

    pub fn total_in_reserve(&self) -> Amount {
        self.ledger.total_in_reserve(&self.reserve)
    }

    pub fn profit(&self) -> Amount {
        self.ledger.profit(&self.reserve)
    }

    pub fn report(&self) -> Report {
        self.ledger.report(&self.reserve)
    }

    /// Insert one coin. Returns the new balance.
    pub fn deposit_coin(&mut self, denomination: Denomination) -> Result<Amount, EngineError> {
        self.reserve.deposit(denomination)?;
        self.balance += Amount::from(denomination);
        Ok(self.balance)
    }

    /// Buy the item at the 0-based `index`:
    /// - Ensure the index is in range and the item is in stock
    /// - Ensure the balance covers the price (balance kept on failure)
    /// - Decrement stock, hand out change, zero the balance
    ///
    /// Any change the reserve cannot cover stays in the machine.
    pub fn purchase(&mut self, index: usize) -> Result<Sale, EngineError> {
        let item = self.catalog.get(index).map_err(PurchaseError::from)?;

        if !item.is_available() {
            return Err(PurchaseError::OutOfStock(item.name.clone()).into());
        }

        if self.balance < item.price {
            return Err(PurchaseError::InsufficientFunds {
                price: item.price,
                balance: self.balance,
                shortfall: item.price - self.balance,
            }
            .into());
        }

        let name = item.name.clone();
        let price = item.price;
        self.catalog.decrement_stock(index);

        let change_due = self.balance - price;
        let change = change_due
            .is_positive()
            .then(|| self.give_change(change_due));
        self.balance = Amount::ZERO;

        Ok(Sale {
            item: name,
            price,
            change,
        })
    }

    /// Return the staged balance as coins.
    pub fn refund(&mut self) -> Refund {
        if !self.balance.is_positive() {
            return Refund::Nothing;
        }
        let change = self.give_change(self.balance);
        self.balance = Amount::ZERO;
        Refund::Returned(change)
    }

    pub fn restock(
        &mut self,
        name: &str,
        price: Amount,
        quantity: i64,
    ) -> Result<Restock, EngineError> {
        let restock = self.catalog.upsert(name, price, quantity)?;
        if let Restock::Updated {
            previous_price: Some(previous),
        } = restock
        {
            info!(item = name.trim(), from = %previous, to = %price, "price changed");
        }
        Ok(restock)
    }

    pub fn collect(&mut self) -> Collection {
        self.ledger.collect(&mut self.reserve)
    }

    /// Apply a single command on top of the current engine state
    pub fn apply(&mut self, command: Command) -> Result<Outcome, EngineError> {
        let result = match &command {
            Command::List => Ok(Outcome::Listed(self.list())),
            Command::InsertCoin(coin) => self
                .deposit_coin(*coin)
                .map(|balance| Outcome::Deposited {
                    coin: *coin,
                    balance,
                }),
            Command::Purchase(index) => self.purchase(*index).map(Outcome::Sold),
            Command::Refund => Ok(Outcome::Refunded(self.refund())),
            Command::Restock {
                name,
                price,
                quantity,
            } => self
                .restock(name, *price, *quantity)
                .map(Outcome::Restocked),
            Command::Report => Ok(Outcome::Reported(self.report())),
            Command::Collect => Ok(Outcome::Collected(self.collect())),
        };
        self.log_result(command.name(), &result);
        result
    }
}

/// Private API
impl Engine {
    /// Small helper to log `apply` results
    fn log_result(&self, command: &str, result: &Result<Outcome, EngineError>) {
        match result {
            Ok(_) => {
                info!(
                    balance = %self.balance,
                    reserve = %self.reserve.total_value(),
                    "{command} applied"
                );
            }
            Err(e) => {
                info!(
                    balance = %self.balance,
                    reason = %e,
                    "{command} skipped"
                );
            }
        }
    }

    /// Dispense `amount` from the reserve, warning on a shortfall.
    fn give_change(&mut self, amount: Amount) -> Change {
        let change = self.reserve.dispense(amount);
        if change.is_short() {
            warn!(
                requested = %change.requested,
                dispensed = %change.dispensed(),
                remainder = %change.remainder,
                "could not return full change"
            );
        }
        change
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // test utils

    fn units(value: i64) -> Amount {
        Amount::from_units(value)
    }

    fn stocked() -> Engine {
        let mut engine = Engine::new();
        engine.restock("Water", units(50), 10).unwrap();
        engine.restock("Chips", units(80), 1).unwrap();
        engine
    }

    fn insert(engine: &mut Engine, coins: &[Denomination]) {
        for coin in coins {
            engine.deposit_coin(*coin).unwrap();
        }
    }

    #[test]
    fn new_engine() {
        let engine = Engine::new();
        assert_eq!(engine.balance(), Amount::ZERO);
        assert!(engine.catalog().is_empty());
        assert_eq!(engine.total_in_reserve(), units(1880));
        assert_eq!(engine.profit(), Amount::ZERO);
    }

    // Deposit

    #[test]
    fn deposit_increases_balance_and_reserve() {
        let mut engine = Engine::new();
        assert_eq!(engine.deposit_coin(10), Ok(units(10)));
        assert_eq!(engine.deposit_coin(5), Ok(units(15)));
        assert_eq!(engine.total_in_reserve(), units(1895));
    }

    #[test]
    fn deposit_unsupported_denomination_fails() {
        let mut engine = Engine::new();
        engine.deposit_coin(10).unwrap();

        let result = engine.deposit_coin(3);
        assert_eq!(
            result,
            Err(EngineError::Deposit(DepositError::UnsupportedDenomination(3)))
        );

        // Balance and reserve unchanged
        assert_eq!(engine.balance(), units(10));
        assert_eq!(engine.total_in_reserve(), units(1890));
    }

    // Purchase

    #[test]
    fn purchase_exact_amount_has_no_change() {
        let mut engine = stocked();
        insert(&mut engine, &[50]);

        let sale = engine.purchase(0).unwrap();
        assert_eq!(sale.item, "Water");
        assert_eq!(sale.change, None);
        assert_eq!(engine.balance(), Amount::ZERO);
        assert_eq!(engine.catalog().get(0).unwrap().stock, 9);
        assert_eq!(engine.profit(), units(50));
    }

    #[test]
    fn purchase_returns_greedy_change() {
        let mut engine = stocked();
        insert(&mut engine, &[100]);

        let sale = engine.purchase(0).unwrap();
        let change = sale.change.unwrap();
        assert_eq!(change.coins, vec![50]);
        assert_eq!(change.remainder, Amount::ZERO);
        assert_eq!(engine.balance(), Amount::ZERO);
        // reserve grows by exactly the price
        assert_eq!(engine.total_in_reserve(), units(1930));
    }

    #[test]
    fn purchase_conserves_balance_over_deposit_sequences() {
        let sequences: [&[Denomination]; 4] =
            [&[50], &[20, 20, 10], &[100, 2, 1], &[5, 5, 10, 20, 50, 100]];
        for coins in sequences {
            let mut engine = stocked();
            insert(&mut engine, coins);
            let paid: Amount = coins.iter().copied().map(Amount::from).sum();

            let sale = engine.purchase(0).unwrap();
            let dispensed = sale.change.as_ref().map_or(Amount::ZERO, Change::dispensed);
            assert_eq!(engine.balance(), Amount::ZERO);
            assert_eq!(dispensed, paid - units(50), "coins {coins:?}");
        }
    }

    #[test]
    fn purchase_with_change_shortfall_still_completes() {
        let mut engine = stocked();
        insert(&mut engine, &[50, 1]);
        engine.reserve.set_count(1, 0);

        let sale = engine.purchase(0).unwrap();
        assert!(sale.is_short());
        let change = sale.change.unwrap();
        assert!(change.coins.is_empty());
        assert_eq!(change.remainder, units(1));
        // absorbed as float, never owed
        assert_eq!(engine.balance(), Amount::ZERO);
        assert_eq!(engine.catalog().get(0).unwrap().stock, 9);
    }

    #[test]
    fn purchase_invalid_selection_fails() {
        let mut engine = stocked();
        insert(&mut engine, &[100]);

        let result = engine.purchase(2);
        assert_eq!(
            result,
            Err(EngineError::Purchase(PurchaseError::InvalidSelection {
                index: 2,
                len: 2
            }))
        );
        assert_eq!(engine.balance(), units(100));
        assert_eq!(engine.total_in_reserve(), units(1980));
    }

    #[test]
    fn purchase_out_of_stock_fails() {
        let mut engine = stocked();
        insert(&mut engine, &[100, 100]);
        engine.purchase(1).unwrap();
        insert(&mut engine, &[100]);

        let reserve_before = engine.total_in_reserve();
        let result = engine.purchase(1);
        assert_eq!(
            result,
            Err(EngineError::Purchase(PurchaseError::OutOfStock(
                "Chips".into()
            )))
        );
        assert_eq!(engine.balance(), units(100));
        assert_eq!(engine.total_in_reserve(), reserve_before);
    }

    #[test]
    fn purchase_insufficient_funds_keeps_balance() {
        let mut engine = stocked();
        insert(&mut engine, &[20, 20]);

        let result = engine.purchase(0);
        assert_eq!(
            result,
            Err(EngineError::Purchase(PurchaseError::InsufficientFunds {
                price: units(50),
                balance: units(40),
                shortfall: units(10),
            }))
        );
        assert_eq!(engine.balance(), units(40));
        assert_eq!(engine.catalog().get(0).unwrap().stock, 10);

        // topping up allows the retry
        insert(&mut engine, &[10]);
        assert!(engine.purchase(0).is_ok());
    }

    // Refund

    #[test]
    fn refund_returns_balance() {
        let mut engine = Engine::new();
        insert(&mut engine, &[5, 10]);

        let Refund::Returned(change) = engine.refund() else {
            panic!("expected coins back");
        };
        assert_eq!(change.coins, vec![10, 5]);
        assert_eq!(change.dispensed(), units(15));
        assert_eq!(engine.balance(), Amount::ZERO);
        assert_eq!(engine.total_in_reserve(), units(1880));
    }

    #[test]
    fn refund_with_zero_balance_is_noop() {
        let mut engine = Engine::new();
        assert_eq!(engine.refund(), Refund::Nothing);
        assert_eq!(engine.total_in_reserve(), units(1880));
    }

    // Restock / collect

    #[test]
    fn restock_invalid_arguments_fail() {
        let mut engine = Engine::new();
        assert_eq!(
            engine.restock("", units(50), 1),
            Err(EngineError::Restock(RestockError::BlankName))
        );
        assert!(engine.catalog().is_empty());
    }

    #[test]
    fn profit_and_collection() {
        let mut engine = stocked();
        insert(&mut engine, &[100, 20]);
        engine.purchase(1).unwrap();
        insert(&mut engine, &[20, 20]);
        engine.purchase(1).unwrap_err();
        engine.refund();
        assert_eq!(engine.profit(), units(80));

        insert(&mut engine, &[20, 20]);
        engine.purchase(0).unwrap_err();
        insert(&mut engine, &[10]);
        engine.purchase(0).unwrap();
        assert_eq!(engine.profit(), units(130));
        assert_eq!(
            engine.report(),
            Report {
                total: units(2010),
                profit: units(130)
            }
        );

        assert_eq!(engine.collect(), Collection::Collected(units(130)));
        assert_eq!(engine.total_in_reserve(), units(1880));
        assert_eq!(engine.collect(), Collection::NoProfit(Amount::ZERO));
    }

    // Apply

    #[test]
    fn apply_dispatches_commands() {
        let mut engine = Engine::new();
        let restock = Command::Restock {
            name: "Water".into(),
            price: units(50),
            quantity: 2,
        };
        assert_eq!(
            engine.apply(restock),
            Ok(Outcome::Restocked(Restock::Added))
        );
        assert_eq!(
            engine.apply(Command::InsertCoin(50)),
            Ok(Outcome::Deposited {
                coin: 50,
                balance: units(50)
            })
        );
        assert!(matches!(
            engine.apply(Command::Purchase(0)),
            Ok(Outcome::Sold(Sale { change: None, .. }))
        ));
        assert!(matches!(
            engine.apply(Command::List),
            Ok(Outcome::Listed(listing)) if listing.len() == 1
        ));
        assert!(engine.apply(Command::InsertCoin(7)).is_err());
        assert_eq!(
            engine.apply(Command::Collect),
            Ok(Outcome::Collected(Collection::Collected(units(50))))
        );
    }
}
