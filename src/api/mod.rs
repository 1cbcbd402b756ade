//! Backend API

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::orders::{OrderDraft, OrderReceipt};
use crate::products::{Banner, Category, Product};

mod http;

pub use http::HttpClient;

/// Errors surfaced by the backend API client.
///
/// Classification happens here once so callers only ever match on
/// [`ApiError::InsufficientStock`] versus everything else.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the order for lack of stock (HTTP 409 or a
    /// recognizable error code in the body).
    #[error("insufficient stock")]
    InsufficientStock,

    /// The backend answered with an unexpected non-success status.
    #[error("backend responded with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text, possibly empty
        body: String,
    },

    /// Transport, TLS, or body-decoding failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success status carrying a body the client cannot use.
    #[error("unexpected response from backend: {0}")]
    Unexpected(String),
}

/// Order-submission side of the backend.
#[automock]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// Submits an order draft to `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`], with stock conflicts already classified
    /// as [`ApiError::InsufficientStock`].
    async fn create_order(&self, draft: OrderDraft) -> Result<OrderReceipt, ApiError>;
}

/// Read-only catalog side of the backend.
#[automock]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Retrieves all products.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or backend failure.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// Retrieves a single product by slug.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or backend failure.
    async fn get_product(&self, slug: &str) -> Result<Product, ApiError>;

    /// Retrieves all categories.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or backend failure.
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;

    /// Retrieves the active promotional banners.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport or backend failure.
    async fn list_banners(&self) -> Result<Vec<Banner>, ApiError>;
}
