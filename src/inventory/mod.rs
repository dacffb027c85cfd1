//! Inventory - stock items and the deltas that move their quantity.
//!
//! The classic optimistic-locking example: reserving stock must never drive
//! a quantity negative and must never lose a concurrent reservation.

use serde::{Deserialize, Serialize};

use crate::engine::MutationEngine;
use crate::mutation::Mutation;
use crate::outcome::Outcome;
use crate::store::RecordStore;
use crate::Record;

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[record(collection = "stock_items")]
pub struct StockItem {
    #[record(id)]
    pub sku: String,
    pub name: String,
    pub quantity: u64,
}

impl StockItem {
    pub fn new(sku: impl Into<String>, name: impl Into<String>, quantity: u64) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            quantity,
        }
    }

    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }
}

/// Take `quantity` units out of stock. Rejected when stock is insufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub quantity: u64,
}

impl Reserve {
    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }
}

impl Mutation<StockItem> for Reserve {
    fn check(&self, current: &StockItem) -> Result<(), String> {
        if current.quantity >= self.quantity {
            Ok(())
        } else {
            Err(format!(
                "insufficient quantity: requested {}, available {}",
                self.quantity, current.quantity
            ))
        }
    }

    fn transform(&self, current: &StockItem) -> StockItem {
        current.with_quantity(current.quantity - self.quantity)
    }
}

/// Put `quantity` units back into stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub quantity: u64,
}

impl Restock {
    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }
}

impl Mutation<StockItem> for Restock {
    fn check(&self, current: &StockItem) -> Result<(), String> {
        match current.quantity.checked_add(self.quantity) {
            Some(_) => Ok(()),
            None => Err(format!(
                "quantity overflow: {} + {}",
                current.quantity, self.quantity
            )),
        }
    }

    fn transform(&self, current: &StockItem) -> StockItem {
        current.with_quantity(current.quantity + self.quantity)
    }
}

/// Reserve stock for `sku`.
pub fn reserve<S: RecordStore>(
    engine: &MutationEngine<S>,
    sku: &str,
    quantity: u64,
) -> Outcome<StockItem> {
    engine.submit(sku, &Reserve::new(quantity))
}

/// Return stock for `sku`.
pub fn restock<S: RecordStore>(
    engine: &MutationEngine<S>,
    sku: &str,
    quantity: u64,
) -> Outcome<StockItem> {
    engine.submit(sku, &Restock::new(quantity))
}
