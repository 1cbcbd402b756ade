//! The product-add / buy-now protocol.
//!
//! One pure state machine for every product surface. Callers hand in the
//! current cart and ledger plus the request; the functions here apply the
//! transition and return what happened, so no widget re-derives quantity
//! logic on its own.
//!
//! An attempt moves through the phases
//! `Idle -> Validating -> Reserving -> Submitting -> {Succeeded, RolledBack}`.
//! Reservation happens before the network call returns: the UI prioritises
//! responsiveness, and the server stays authoritative and may still reject
//! the order afterwards.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

use crate::cart::{Cart, CartLine};
use crate::products::{Product, ProductId};
use crate::stock::StockLedger;

/// Phases of a single product-add attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    /// Nothing requested yet.
    Idle,
    /// Checking the requested quantity against available stock.
    Validating,
    /// Applying the optimistic cart mutation and ledger delta.
    Reserving,
    /// Awaiting the backend's answer.
    Submitting,
    /// The backend accepted the order.
    Succeeded,
    /// The reservation was reversed after a failure.
    RolledBack,
}

impl Display for AttemptPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Reserving => "reserving",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::RolledBack => "rolled_back",
        };

        f.write_str(name)
    }
}

/// Local quantity validation failures. No state is mutated and no network
/// call is made when these are returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// The requested quantity was zero.
    #[error("quantity must be at least 1")]
    Zero,

    /// The requested quantity exceeds the locally computed available stock.
    #[error("only {available} items available")]
    Unavailable {
        /// What the caller asked for
        requested: u32,
        /// What the ledger says is left
        available: u32,
    },
}

/// A successfully applied optimistic reservation, needed to later settle
/// or release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Reserved product
    pub product_id: ProductId,

    /// Reserved quantity
    pub quantity: u32,
}

/// Validates the request and applies the optimistic reservation.
///
/// On success the cart line is merged in and a matching negative delta is
/// recorded in the ledger, synchronously, before any network traffic.
///
/// # Errors
///
/// Returns a [`QuantityError`] when the quantity is zero or exceeds the
/// effective stock; the cart and ledger are left untouched.
pub fn reserve(
    cart: &mut Cart,
    ledger: &mut StockLedger,
    product: &Product,
    quantity: u32,
) -> Result<Reservation, QuantityError> {
    if quantity == 0 {
        return Err(QuantityError::Zero);
    }

    let available = ledger.effective_stock(product);

    if quantity > available {
        return Err(QuantityError::Unavailable {
            requested: quantity,
            available,
        });
    }

    cart.add_item(CartLine::from_product(product, quantity));
    ledger.apply_delta(&product.id, -i64::from(quantity));

    Ok(Reservation {
        product_id: product.id.clone(),
        quantity,
    })
}

/// Reverses a reservation after a failed submission.
///
/// The reserved quantity is subtracted from the cart line (removing it
/// when it reaches zero) and the ledger delta is returned.
pub fn release(cart: &mut Cart, ledger: &mut StockLedger, reservation: &Reservation) {
    let remaining = cart
        .quantity_of(&reservation.product_id)
        .saturating_sub(reservation.quantity);

    cart.update_quantity(&reservation.product_id, remaining);
    ledger.apply_delta(&reservation.product_id, i64::from(reservation.quantity));
}

/// Reconciles a reservation after the backend accepted the order.
///
/// The cart line is removed and the product's ledger delta is cleared:
/// the next catalog fetch reports the decremented server stock, so a
/// surviving delta would double-count the purchase.
pub fn settle(cart: &mut Cart, ledger: &mut StockLedger, reservation: &Reservation) {
    cart.remove_item(&reservation.product_id);
    ledger.clear_delta(&reservation.product_id);
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn product(id: &str, stock: u32) -> Product {
        Product {
            id: ProductId::from(id),
            slug: format!("product-{id}"),
            title: format!("Product {id}"),
            price: Decimal::new(10_00, 2),
            compare_at_price: None,
            image: None,
            stock,
        }
    }

    #[test]
    fn reserve_merges_cart_line_and_records_negative_delta() -> TestResult {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 10);

        let reservation = reserve(&mut cart, &mut ledger, &product, 2)?;

        assert_eq!(reservation.quantity, 2);
        assert_eq!(cart.quantity_of(&product.id), 2);
        assert_eq!(ledger.delta(&product.id), -2);
        assert_eq!(ledger.effective_stock(&product), 8);

        Ok(())
    }

    #[test]
    fn reserve_rejects_zero_quantity() {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 10);

        let result = reserve(&mut cart, &mut ledger, &product, 0);

        assert_eq!(result, Err(QuantityError::Zero));
        assert!(cart.is_empty(), "rejected requests must not touch the cart");
    }

    #[test]
    fn reserve_rejects_more_than_available() {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 3);

        let result = reserve(&mut cart, &mut ledger, &product, 5);

        assert_eq!(
            result,
            Err(QuantityError::Unavailable {
                requested: 5,
                available: 3,
            })
        );
        assert!(cart.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn earlier_reservations_shrink_what_is_available() -> TestResult {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 3);

        reserve(&mut cart, &mut ledger, &product, 2)?;

        let result = reserve(&mut cart, &mut ledger, &product, 2);

        assert_eq!(
            result,
            Err(QuantityError::Unavailable {
                requested: 2,
                available: 1,
            })
        );

        Ok(())
    }

    #[test]
    fn release_is_the_exact_inverse_of_reserve() -> TestResult {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 10);

        let reservation = reserve(&mut cart, &mut ledger, &product, 2)?;
        release(&mut cart, &mut ledger, &reservation);

        assert!(cart.is_empty());
        assert!(ledger.is_empty(), "rolled-back delta must be pruned");
        assert_eq!(ledger.effective_stock(&product), 10);

        Ok(())
    }

    #[test]
    fn release_preserves_quantity_held_before_the_attempt() -> TestResult {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 10);

        reserve(&mut cart, &mut ledger, &product, 3)?;
        let reservation = reserve(&mut cart, &mut ledger, &product, 2)?;

        release(&mut cart, &mut ledger, &reservation);

        assert_eq!(cart.quantity_of(&product.id), 3);
        assert_eq!(ledger.delta(&product.id), -3);

        Ok(())
    }

    #[test]
    fn settle_removes_the_line_and_clears_the_delta() -> TestResult {
        let mut cart = Cart::new();
        let mut ledger = StockLedger::new();
        let product = product("a", 10);

        let reservation = reserve(&mut cart, &mut ledger, &product, 2)?;
        settle(&mut cart, &mut ledger, &reservation);

        assert!(cart.line(&product.id).is_none());
        assert_eq!(
            ledger.delta(&product.id),
            0,
            "a settled purchase must not keep double-counting against refetched stock"
        );

        Ok(())
    }

    #[test]
    fn attempt_phase_display_names_are_stable() {
        assert_eq!(AttemptPhase::Idle.to_string(), "idle");
        assert_eq!(AttemptPhase::Submitting.to_string(), "submitting");
        assert_eq!(AttemptPhase::RolledBack.to_string(), "rolled_back");
    }
}
