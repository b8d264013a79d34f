//! Error types for dispenser operations.

use thiserror::Error;

use crate::Amount;
use crate::model::Denomination;

/// Top-level error returned by [`Engine::apply`](super::Engine::apply).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("deposit failed: {0}")]
    Deposit(#[from] DepositError),

    #[error("purchase failed: {0}")]
    Purchase(#[from] PurchaseError),

    #[error("restock failed: {0}")]
    Restock(#[from] RestockError),
}

/// Error while inserting a coin.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepositError {
    #[error("unsupported denomination {0}")]
    UnsupportedDenomination(Denomination),
}

/// Error while buying an item. None of these touch balance, stock or reserve.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("invalid selection {index}: catalog has {len} items")]
    InvalidSelection { index: usize, len: usize },

    #[error("'{0}' is out of stock")]
    OutOfStock(String),

    #[error("insufficient funds: price {price}, balance {balance}, short by {shortfall}")]
    InsufficientFunds {
        price: Amount,
        balance: Amount,
        shortfall: Amount,
    },
}

/// Rejected restock arguments; the catalog is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestockError {
    #[error("item name must not be blank")]
    BlankName,

    #[error("price must be positive, got {0}")]
    InvalidPrice(Amount),

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),
}

/// Error from catalog position lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("position {index} out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
}

impl From<CatalogError> for PurchaseError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::OutOfRange { index, len } => PurchaseError::InvalidSelection { index, len },
        }
    }
}
