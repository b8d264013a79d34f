//! Core domain types for the dispenser engine.

use crate::Amount;

/// Coin value accepted by the machine.
pub type Denomination = u32;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Display name, matched case-insensitively on restock.
    pub name: String,
    /// Price per unit, always positive.
    pub price: Amount,
    /// Units left to dispense.
    pub stock: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, price: Amount, stock: u32) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
        }
    }

    pub fn is_available(&self) -> bool {
        self.stock > 0
    }
}

/// A command representing one customer or operator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the catalog.
    List,
    /// Insert one coin; credits the balance.
    InsertCoin(Denomination),
    /// Buy the item at the given 0-based catalog index.
    Purchase(usize),
    /// Return the staged balance as coins.
    Refund,
    /// Add or merge an item (operator).
    Restock {
        name: String,
        price: Amount,
        quantity: i64,
    },
    /// Show reserve total and profit (operator).
    Report,
    /// Withdraw profit and restock the coin reserve (operator).
    Collect,
}

impl Command {
    /// Whether the command needs the operator secret before it may run.
    pub fn requires_operator(&self) -> bool {
        matches!(
            self,
            Command::Restock { .. } | Command::Report | Command::Collect
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::InsertCoin(_) => "insert",
            Command::Purchase(_) => "buy",
            Command::Refund => "refund",
            Command::Restock { .. } => "restock",
            Command::Report => "report",
            Command::Collect => "collect",
        }
    }
}

/// Coins handed back by the reserve for one change request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Change {
    /// Amount that was asked for.
    pub requested: Amount,
    /// Coins in the order they were taken, largest first.
    pub coins: Vec<Denomination>,
    /// Part of `requested` the reserve could not cover.
    pub remainder: Amount,
}

impl Change {
    pub fn dispensed(&self) -> Amount {
        self.coins.iter().copied().map(Amount::from).sum()
    }

    /// True when the reserve could not cover the whole request.
    pub fn is_short(&self) -> bool {
        self.remainder.is_positive()
    }
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub item: String,
    pub price: Amount,
    /// `None` when the balance matched the price exactly.
    pub change: Option<Change>,
}

impl Sale {
    pub fn is_short(&self) -> bool {
        self.change.as_ref().is_some_and(Change::is_short)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refund {
    /// Balance was already zero.
    Nothing,
    Returned(Change),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restock {
    /// A new item was appended to the catalog.
    Added,
    /// Stock was merged into an existing item. `previous_price` is set when
    /// the restock changed the price.
    Updated { previous_price: Option<Amount> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub total: Amount,
    pub profit: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Collected(Amount),
    NoProfit(Amount),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    InStock(u32),
    OutOfStock,
}

/// A display row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// 1-based number shown to customers.
    pub number: usize,
    pub name: String,
    pub price: Amount,
    pub availability: Availability,
}

/// Successful result of [`Engine::apply`](crate::Engine::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed(Vec<Listing>),
    Deposited { coin: Denomination, balance: Amount },
    Sold(Sale),
    Refunded(Refund),
    Restocked(Restock),
    Reported(Report),
    Collected(Collection),
}

impl Outcome {
    /// True when change could not be fully returned.
    pub fn is_short(&self) -> bool {
        match self {
            Outcome::Sold(sale) => sale.is_short(),
            Outcome::Refunded(Refund::Returned(change)) => change.is_short(),
            _ => false,
        }
    }
}
