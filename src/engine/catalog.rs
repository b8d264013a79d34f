use crate::Amount;
use crate::engine::{CatalogError, RestockError};
use crate::model::{Availability, Item, Listing, Restock};

/// Ordered item list. Indices are 0-based and stable: items are never removed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter()
    }

    /// Display rows with 1-based numbers.
    pub fn list(&self) -> Vec<Listing> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| Listing {
                number: index + 1,
                name: item.name.clone(),
                price: item.price,
                availability: if item.is_available() {
                    Availability::InStock(item.stock)
                } else {
                    Availability::OutOfStock
                },
            })
            .collect()
    }

    pub fn get(&self, index: usize) -> Result<&Item, CatalogError> {
        self.items.get(index).ok_or(CatalogError::OutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Case-insensitive lookup by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.items
            .iter()
            .position(|item| item.name.to_lowercase() == name)
    }

    /// Insert a new item or merge into the one with the same name.
    ///
    /// The name is trimmed before it is checked, matched and stored; a merge
    /// keeps the stored spelling, adds `quantity` to the stock and overwrites
    /// the price.
    pub fn upsert(
        &mut self,
        name: &str,
        price: Amount,
        quantity: i64,
    ) -> Result<Restock, RestockError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RestockError::BlankName);
        }
        if !price.is_positive() {
            return Err(RestockError::InvalidPrice(price));
        }
        let added = match u32::try_from(quantity) {
            Ok(q) if q > 0 => q,
            _ => return Err(RestockError::InvalidQuantity(quantity)),
        };

        match self.position(name) {
            Some(index) => {
                let item = &mut self.items[index];
                let previous_price = (item.price != price).then_some(item.price);
                item.price = price;
                item.stock = item.stock.saturating_add(added);
                Ok(Restock::Updated { previous_price })
            }
            None => {
                self.items.push(Item::new(name, price, added));
                Ok(Restock::Added)
            }
        }
    }

    /// Remove one unit. Callers check `stock > 0` first.
    pub(crate) fn decrement_stock(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.stock = item.stock.saturating_sub(1);
        }
    }
}
