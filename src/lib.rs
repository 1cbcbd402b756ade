//! Vitrine
//!
//! Vitrine is the client-side cart, stock-reservation and checkout engine
//! for a storefront. It keeps the cart and the optimistic stock ledger
//! consistent behind one protocol, talks to the backend over HTTP, and
//! persists the cart snapshot so it survives reloads.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod prelude;
pub mod products;
pub mod stock;
pub mod storage;
