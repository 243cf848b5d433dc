//! # Inventory Book
//!
//! Per-store stock levels and the rules for applying a [`Transaction`].
//!
//! ```text
//! ┌─────────────┬────────────────────────────┬──────────────────────────────┐
//! │ Type        │ Source (from_store_id)     │ Destination (to_store_id)    │
//! ├─────────────┼────────────────────────────┼──────────────────────────────┤
//! │ sale        │ − quantity                 │                              │
//! │ consumption │ − quantity                 │                              │
//! │ purchase    │                            │ + quantity (line created at  │
//! │             │                            │   transaction price)         │
//! │ transfer    │ − quantity                 │ + quantity                   │
//! │ adjustment  │ = quantity at to_store_id, or from_store_id if no to      │
//! └─────────────┴───────────────────────────────────────────────────────────┘
//! ```
//!
//! Either the whole transaction applies or nothing changes.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{InventoryLine, Transaction, TransactionType};

type LineKey = (String, String);

/// Stock lines keyed by `(store_id, material_id)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryBook {
    lines: BTreeMap<LineKey, InventoryLine>,
}

impl InventoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from loaded lines. A later line for the same
    /// store/material replaces an earlier one.
    pub fn from_lines(lines: impl IntoIterator<Item = InventoryLine>) -> Self {
        let mut book = Self::new();
        for line in lines {
            book.insert(line);
        }
        book
    }

    pub fn insert(&mut self, line: InventoryLine) {
        let key = (line.store_id.clone(), line.material_id.clone());
        self.lines.insert(key, line);
    }

    pub fn line(&self, store_id: &str, material_id: &str) -> Option<&InventoryLine> {
        self.lines
            .get(&(store_id.to_string(), material_id.to_string()))
    }

    /// Quantity on hand, 0 when there is no line.
    pub fn quantity(&self, store_id: &str, material_id: &str) -> f64 {
        self.line(store_id, material_id)
            .map_or(0.0, |line| line.quantity)
    }

    /// All lines, ordered by store then material.
    pub fn lines(&self) -> impl Iterator<Item = &InventoryLine> {
        self.lines.values()
    }

    /// Lines of one store.
    pub fn store_lines<'a>(&'a self, store_id: &'a str) -> impl Iterator<Item = &'a InventoryLine> {
        self.lines
            .values()
            .filter(move |line| line.store_id == store_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Applies a transaction.
    ///
    /// ## Errors
    /// - [`CoreError::Validation`] when the transaction is malformed or
    ///   lacks the store reference its type needs
    /// - [`CoreError::InsufficientStock`] when a decrement would go negative
    ///
    /// On error the book is unchanged.
    pub fn apply(&mut self, tx: &Transaction) -> CoreResult<()> {
        tx.validate()?;

        // Compute every new line first, then commit together.
        let updates = match tx.transaction_type {
            TransactionType::Sale | TransactionType::Consumption => {
                let from = required_store(&tx.from_store_id, "from_store_id")?;
                vec![self.decremented(from, tx)?]
            }
            TransactionType::Purchase => {
                let to = required_store(&tx.to_store_id, "to_store_id")?;
                vec![self.incremented(to, tx)]
            }
            TransactionType::Transfer => {
                let from = required_store(&tx.from_store_id, "from_store_id")?;
                let to = required_store(&tx.to_store_id, "to_store_id")?;
                vec![self.decremented(from, tx)?, self.incremented(to, tx)]
            }
            TransactionType::Adjustment => {
                let store = required_store(&tx.to_store_id, "to_store_id")
                    .or_else(|_| required_store(&tx.from_store_id, "store_id"))?;
                let mut line = self.line_or_new(store, tx);
                line.quantity = tx.quantity;
                vec![line]
            }
        };

        debug!(
            transaction_id = %tx.id,
            transaction_type = %tx.transaction_type,
            material_id = %tx.material_id,
            quantity = tx.quantity,
            "Applied transaction to inventory"
        );

        for line in updates {
            self.insert(line);
        }

        Ok(())
    }

    fn decremented(&self, store_id: &str, tx: &Transaction) -> CoreResult<InventoryLine> {
        let available = self.quantity(store_id, &tx.material_id);
        if tx.quantity > available {
            return Err(CoreError::InsufficientStock {
                store_id: store_id.to_string(),
                material_id: tx.material_id.clone(),
                available,
                requested: tx.quantity,
            });
        }

        let mut line = self.line_or_new(store_id, tx);
        line.quantity = available - tx.quantity;
        Ok(line)
    }

    fn incremented(&self, store_id: &str, tx: &Transaction) -> InventoryLine {
        let mut line = self.line_or_new(store_id, tx);
        line.quantity += tx.quantity;
        line
    }

    fn line_or_new(&self, store_id: &str, tx: &Transaction) -> InventoryLine {
        self.line(store_id, &tx.material_id)
            .cloned()
            .unwrap_or_else(|| InventoryLine {
                store_id: store_id.to_string(),
                material_id: tx.material_id.clone(),
                quantity: 0.0,
                price: tx.price,
                material_name: None,
                category: None,
                last_updated: None,
            })
    }
}

fn required_store<'a>(store: &'a Option<String>, field: &str) -> CoreResult<&'a str> {
    store
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ValidationError::required(field).into())
}

// =============================================================================
// Unit Tests
// =============================================================================
