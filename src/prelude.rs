//! Vitrine prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{ApiError, CatalogApi, HttpClient, OrdersApi},
    cart::{Cart, CartLine},
    checkout::{
        CheckoutError, Session,
        protocol::{AttemptPhase, QuantityError, Reservation},
    },
    config::{Config, ConfigError},
    orders::{Customer, CustomerError, OrderDraft, OrderLine, OrderReceipt, Payment, Totals},
    products::{Banner, Category, Product, ProductId},
    stock::StockLedger,
    storage::{CART_STORAGE_KEY, CartStorage, JsonFileStorage, StorageError},
};
