//! Local stock delta ledger.
//!
//! A process-wide map from product id to a signed adjustment against the
//! server-reported stock, so independently rendered product widgets agree
//! on one "available now" number without refetching. Negative deltas are
//! optimistic reservations; positive deltas are releases. The ledger is
//! advisory only: the server remains authoritative and a fresh catalog
//! fetch overwrites the local view.

use rustc_hash::FxHashMap;

use crate::products::{Product, ProductId};

/// Per-product signed stock adjustments. Zero entries are pruned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLedger {
    deltas: FxHashMap<ProductId, i64>,
}

impl StockLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the product's entry (default 0), pruning the entry
    /// when the accumulated value reaches exactly zero.
    pub fn apply_delta(&mut self, id: &ProductId, delta: i64) {
        let value = self.deltas.get(id).copied().unwrap_or(0) + delta;

        if value == 0 {
            self.deltas.remove(id);
        } else {
            self.deltas.insert(id.clone(), value);
        }
    }

    /// Overwrites the product's entry; zero removes it.
    pub fn set_delta(&mut self, id: &ProductId, value: i64) {
        if value == 0 {
            self.deltas.remove(id);
        } else {
            self.deltas.insert(id.clone(), value);
        }
    }

    /// Removes the product's entry.
    pub fn clear_delta(&mut self, id: &ProductId) {
        self.deltas.remove(id);
    }

    /// Removes every entry.
    pub fn clear_all(&mut self) {
        self.deltas.clear();
    }

    /// Returns the accumulated delta for a product (0 when absent).
    #[must_use]
    pub fn delta(&self, id: &ProductId) -> i64 {
        self.deltas.get(id).copied().unwrap_or(0)
    }

    /// Server stock adjusted by the local delta, clamped to zero.
    #[must_use]
    pub fn effective_stock(&self, product: &Product) -> u32 {
        let adjusted = (i64::from(product.stock) + self.delta(&product.id)).max(0);

        u32::try_from(adjusted).unwrap_or(u32::MAX)
    }

    /// Whether the ledger has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}
