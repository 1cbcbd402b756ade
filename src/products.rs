//! Products

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable external product identifier, as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a product id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A catalog product as reported by the backend.
///
/// `stock` is the server-reported quantity at fetch time; the locally
/// adjusted view lives in [`crate::stock::StockLedger`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,

    /// URL slug
    pub slug: String,

    /// Display title
    pub title: String,

    /// Unit price
    pub price: Decimal,

    /// Pre-discount price, when the product is on offer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Decimal>,

    /// Primary image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Server-reported stock at fetch time
    #[serde(default, alias = "availableStock")]
    pub stock: u32,
}

/// A catalog category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category id
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Display name
    pub name: String,

    /// URL slug
    pub slug: String,
}

/// A promotional banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    /// Banner id
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Banner headline
    pub title: String,

    /// Image URL
    pub image: String,

    /// Optional click-through link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn product_deserializes_backend_field_names() -> TestResult {
        let json = r#"{
            "_id": "p-1",
            "slug": "green-mug",
            "title": "Green Mug",
            "price": "12.50",
            "compareAtPrice": "15.00",
            "availableStock": 7
        }"#;

        let product: Product = serde_json::from_str(json)?;

        assert_eq!(product.id, ProductId::from("p-1"));
        assert_eq!(product.price, Decimal::new(1250, 2));
        assert_eq!(product.compare_at_price, Some(Decimal::new(1500, 2)));
        assert_eq!(product.stock, 7);

        Ok(())
    }

    #[test]
    fn product_stock_defaults_to_zero_when_absent() -> TestResult {
        let json = r#"{
            "_id": "p-2",
            "slug": "blue-mug",
            "title": "Blue Mug",
            "price": "9.99"
        }"#;

        let product: Product = serde_json::from_str(json)?;

        assert_eq!(product.stock, 0);
        assert!(product.image.is_none());

        Ok(())
    }

    #[test]
    fn product_id_displays_inner_string() {
        let id = ProductId::new("p-42");

        assert_eq!(id.to_string(), "p-42");
        assert_eq!(id.as_str(), "p-42");
    }
}
