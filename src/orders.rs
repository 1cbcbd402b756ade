//! Order submission payloads.
//!
//! Wire shapes for `POST /orders`, serialized with the backend's camelCase
//! field names. The payload is derived from cart state at submission time
//! and never persisted client-side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cart::CartLine;
use crate::products::ProductId;

/// Errors from local customer-contact validation.
///
/// These are rejected before any network call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustomerError {
    /// The customer name is empty.
    #[error("customer name is required")]
    MissingName,

    /// The customer phone number is empty.
    #[error("customer phone number is required")]
    MissingPhone,
}

/// Flat customer-contact structure attached to an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Full name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Delivery address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Delivery city
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Free-form order notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Customer {
    /// Checks the required contact fields.
    ///
    /// # Errors
    ///
    /// Returns a [`CustomerError`] when the name or phone is empty.
    pub fn validate(&self) -> Result<(), CustomerError> {
        if self.name.trim().is_empty() {
            return Err(CustomerError::MissingName);
        }

        if self.phone.trim().is_empty() {
            return Err(CustomerError::MissingPhone);
        }

        Ok(())
    }
}

/// One ordered line: product id and quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product id
    #[serde(rename = "_id")]
    pub product_id: ProductId,

    /// Ordered quantity
    pub quantity: u32,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
        }
    }
}

/// Computed totals for the lines being submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of unit price times quantity
    pub subtotal: Decimal,

    /// Amount charged; equals the subtotal while shipping and payment
    /// processing live outside this crate
    pub total: Decimal,
}

impl Totals {
    /// Totals over a set of cart lines.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let subtotal: Decimal = lines
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();

        Self {
            subtotal,
            total: subtotal,
        }
    }
}

/// Payment stub carried on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Payment method identifier understood by the backend
    pub method: String,
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            method: "cash_on_delivery".to_owned(),
        }
    }
}

/// The full `POST /orders` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Ordered lines
    pub items: Vec<OrderLine>,

    /// Customer contact fields
    pub customer: Customer,

    /// Computed totals
    pub totals: Totals,

    /// Payment stub
    pub payment: Payment,

    /// Client-generated token deduplicating retried submissions
    pub idempotency_key: String,
}

impl OrderDraft {
    /// Builds a draft over the given cart lines with a fresh
    /// idempotency key.
    #[must_use]
    pub fn from_lines(lines: &[CartLine], customer: Customer) -> Self {
        Self {
            items: lines.iter().map(OrderLine::from).collect(),
            customer,
            totals: Totals::from_lines(lines),
            payment: Payment::default(),
            idempotency_key: new_idempotency_key(),
        }
    }
}

/// Server acknowledgement of an accepted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Whether the backend accepted the order
    pub ok: bool,

    /// Backend order id
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Human-facing order number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
}

/// Generates a fresh random idempotency key.
#[must_use]
pub fn new_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}
