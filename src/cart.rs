//! Cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::{Product, ProductId};

/// A single cart line.
///
/// Everything but `quantity` is a display snapshot captured when the line
/// was created; it is not re-synced against the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product id
    pub product_id: ProductId,

    /// Title at add time
    pub title: String,

    /// Slug at add time
    pub slug: String,

    /// Unit price at add time
    pub price: Decimal,

    /// Image URL at add time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Requested quantity, always at least 1
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot a product into a cart line with the given quantity.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            slug: product.slug.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }
}

/// The client-side cart: an ordered list of lines, at most one per product.
///
/// None of the operations here can fail; stock validation is the caller's
/// concern (see [`crate::checkout::protocol`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line to the cart.
    ///
    /// When a line for the same product already exists its quantity is
    /// incremented by the new line's quantity; otherwise the line is
    /// appended. No upper bound is enforced here.
    pub fn add_item(&mut self, line: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            existing.quantity += line.quantity;
        } else {
            self.lines.push(line);
        }
    }

    /// Sets the quantity for a product's line.
    ///
    /// A quantity of zero removes the line. No clamping against stock is
    /// performed.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| &line.product_id == id) {
            line.quantity = quantity;
        }
    }

    /// Removes a product's line, if present.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.lines.retain(|line| &line.product_id != id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the line for a product, if present.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == id)
    }

    /// Returns the quantity currently in the cart for a product.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.line(id).map_or(0, |line| line.quantity)
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Iterates over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
