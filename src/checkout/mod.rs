//! Checkout

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, OrdersApi};
use crate::cart::{Cart, CartLine};
use crate::orders::{Customer, CustomerError, OrderDraft, OrderReceipt};
use crate::products::{Product, ProductId};
use crate::stock::StockLedger;
use crate::storage::CartStorage;

pub mod protocol;

use protocol::{AttemptPhase, QuantityError, Reservation};

/// Errors surfaced by cart and checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The requested quantity failed local validation; nothing was
    /// mutated and no network call was made.
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// The customer contact fields failed local validation.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// A submission for this product is already outstanding; the attempt
    /// was dropped, not queued.
    #[error("an order for this product is already being submitted")]
    InFlight,

    /// Checkout was requested on an empty cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// The backend rejected the order for lack of stock; the optimistic
    /// reservation has been rolled back.
    #[error("insufficient stock for this order")]
    InsufficientStock,

    /// The backend or the network failed; the optimistic reservation has
    /// been rolled back.
    #[error("order service unavailable, try again later")]
    Service(#[source] ApiError),
}

fn map_api_error(error: ApiError) -> CheckoutError {
    match error {
        ApiError::InsufficientStock => CheckoutError::InsufficientStock,
        other => CheckoutError::Service(other),
    }
}

#[derive(Debug, Default)]
struct SessionState {
    cart: Cart,
    ledger: StockLedger,
    in_flight: FxHashSet<ProductId>,
}

/// The storefront session: cart, stock ledger, and the checkout protocol
/// behind one injected-repository surface.
///
/// All methods take `&self`; state lives behind a mutex that is never held
/// across an await, so submissions for different products may proceed
/// concurrently while the per-product in-flight flag drops duplicates.
/// In-flight submissions are not cancelled: a dropped future leaves its
/// reservation and flag in place, exactly as a discarded response would.
pub struct Session {
    state: Mutex<SessionState>,
    orders: Arc<dyn OrdersApi>,
    storage: Arc<dyn CartStorage>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Session")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session with an empty cart.
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersApi>, storage: Arc<dyn CartStorage>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            orders,
            storage,
        }
    }

    /// Creates a session from the persisted cart snapshot, when one
    /// exists and can be read.
    ///
    /// Ledger deltas are rebuilt from the restored lines so the available
    /// counts already reflect what the cart holds. A missing or unreadable
    /// snapshot degrades to an empty cart; the failure is logged, never
    /// surfaced.
    #[must_use]
    pub fn restore(orders: Arc<dyn OrdersApi>, storage: Arc<dyn CartStorage>) -> Self {
        let cart = match storage.load() {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(error) => {
                warn!(%error, "failed to load cart snapshot, starting empty");
                Cart::new()
            }
        };

        let mut ledger = StockLedger::new();

        for line in cart.iter() {
            ledger.set_delta(&line.product_id, -i64::from(line.quantity));
        }

        Self {
            state: Mutex::new(SessionState {
                cart,
                ledger,
                in_flight: FxHashSet::default(),
            }),
            orders,
            storage,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Best-effort snapshot persistence: a failed save is logged and
    /// swallowed so cart mutations themselves cannot fail.
    fn persist(&self, state: &SessionState) {
        if let Err(error) = self.storage.save(&state.cart) {
            warn!(%error, "failed to persist cart snapshot");
        }
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state().cart.clone()
    }

    /// Server stock adjusted by the local ledger, clamped to zero. Every
    /// product surface reads this one number.
    #[must_use]
    pub fn available(&self, product: &Product) -> u32 {
        self.state().ledger.effective_stock(product)
    }

    /// The accumulated local delta for a product (0 when absent).
    #[must_use]
    pub fn stock_delta(&self, id: &ProductId) -> i64 {
        self.state().ledger.delta(id)
    }

    /// Whether an order submission for this product is outstanding, so
    /// callers can disable that product's controls.
    #[must_use]
    pub fn is_in_flight(&self, id: &ProductId) -> bool {
        self.state().in_flight.contains(id)
    }

    /// Validates the quantity against available stock, then reserves it:
    /// cart merge plus negative ledger delta, applied synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Quantity`] when validation fails; nothing
    /// is mutated.
    pub fn add_to_cart(&self, product: &Product, quantity: u32) -> Result<(), CheckoutError> {
        let mut guard = self.state();
        let state = &mut *guard;

        protocol::reserve(&mut state.cart, &mut state.ledger, product, quantity)?;

        self.persist(state);

        Ok(())
    }

    /// Sets the cart quantity for a product and re-aligns its ledger
    /// delta. A quantity of zero removes the line.
    ///
    /// No-op while the product has an outstanding submission: its
    /// reservation must stay intact for the pending settle or rollback,
    /// and the product's controls are disabled anyway.
    pub fn update_quantity(&self, id: &ProductId, quantity: u32) {
        let mut state = self.state();

        if state.in_flight.contains(id) {
            return;
        }

        if quantity == 0 {
            state.cart.remove_item(id);
            state.ledger.clear_delta(id);
        } else if state.cart.line(id).is_some() {
            state.cart.update_quantity(id, quantity);
            state.ledger.set_delta(id, -i64::from(quantity));
        } else {
            return;
        }

        self.persist(&state);
    }

    /// Removes a product's line and releases its reservation.
    ///
    /// No-op while the product has an outstanding submission, for the
    /// same reason as [`Session::update_quantity`].
    pub fn remove_item(&self, id: &ProductId) {
        let mut state = self.state();

        if state.in_flight.contains(id) {
            return;
        }

        state.cart.remove_item(id);
        state.ledger.clear_delta(id);

        self.persist(&state);
    }

    /// Empties the cart, the ledger, and the persisted snapshot.
    ///
    /// Lines with an outstanding submission are kept, together with
    /// their reservations, so the pending settle or rollback still has
    /// exact accounting to work against.
    pub fn clear_cart(&self) {
        let mut guard = self.state();
        let state = &mut *guard;

        if state.in_flight.is_empty() {
            state.cart.clear();
            state.ledger.clear_all();

            if let Err(error) = self.storage.clear() {
                warn!(%error, "failed to clear cart snapshot");
            }

            return;
        }

        let retired: Vec<ProductId> = state
            .cart
            .iter()
            .map(|line| line.product_id.clone())
            .filter(|id| !state.in_flight.contains(id))
            .collect();

        for id in &retired {
            state.cart.remove_item(id);
            state.ledger.clear_delta(id);
        }

        self.persist(state);
    }

    /// Submits a single-product order.
    ///
    /// Runs the full attempt state machine: validate, reserve
    /// optimistically, submit with a fresh idempotency key, then settle on
    /// success or roll the reservation back on failure. Navigation after
    /// success is the caller's concern.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InFlight`] when a submission for this product is
    ///   already outstanding (the attempt is dropped).
    /// - [`CheckoutError::Quantity`] / [`CheckoutError::Customer`] on
    ///   local validation failure, before any network call.
    /// - [`CheckoutError::InsufficientStock`] or
    ///   [`CheckoutError::Service`] after a rollback.
    #[tracing::instrument(skip(self, customer), fields(product = %product.id, quantity))]
    pub async fn buy_now(
        &self,
        product: &Product,
        quantity: u32,
        customer: Customer,
    ) -> Result<OrderReceipt, CheckoutError> {
        let (draft, reservation) = {
            let mut guard = self.state();
            let state = &mut *guard;

            if state.in_flight.contains(&product.id) {
                debug!(phase = %AttemptPhase::Idle, "duplicate submission dropped");
                return Err(CheckoutError::InFlight);
            }

            debug!(phase = %AttemptPhase::Validating, "validating request");
            customer.validate()?;

            debug!(phase = %AttemptPhase::Reserving, "applying optimistic reservation");
            let reservation =
                protocol::reserve(&mut state.cart, &mut state.ledger, product, quantity)?;

            state.in_flight.insert(product.id.clone());
            self.persist(state);

            let lines = [CartLine::from_product(product, quantity)];
            let draft = OrderDraft::from_lines(&lines, customer);

            (draft, reservation)
        };

        debug!(phase = %AttemptPhase::Submitting, "submitting order");
        let result = self.orders.create_order(draft).await;

        self.finish_attempt(&reservation, result)
    }

    fn finish_attempt(
        &self,
        reservation: &Reservation,
        result: Result<OrderReceipt, ApiError>,
    ) -> Result<OrderReceipt, CheckoutError> {
        let mut guard = self.state();
        let state = &mut *guard;

        state.in_flight.remove(&reservation.product_id);

        match result {
            Ok(receipt) => {
                protocol::settle(&mut state.cart, &mut state.ledger, reservation);
                self.persist(state);

                debug!(phase = %AttemptPhase::Succeeded, "order accepted");

                Ok(receipt)
            }
            Err(error) => {
                protocol::release(&mut state.cart, &mut state.ledger, reservation);
                self.persist(state);

                debug!(phase = %AttemptPhase::RolledBack, %error, "order failed, reservation rolled back");

                Err(map_api_error(error))
            }
        }
    }

    /// Submits the whole cart as one order.
    ///
    /// Lines were already reserved when they were added, so on failure the
    /// cart is simply left intact. Success clears the cart, the ledger,
    /// and the persisted snapshot.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] when there is nothing to submit.
    /// - [`CheckoutError::InFlight`] when any cart line's product has an
    ///   outstanding submission.
    /// - [`CheckoutError::Customer`] on local validation failure.
    /// - [`CheckoutError::InsufficientStock`] or
    ///   [`CheckoutError::Service`] from the backend.
    #[tracing::instrument(skip(self, customer))]
    pub async fn checkout_cart(&self, customer: Customer) -> Result<OrderReceipt, CheckoutError> {
        let (draft, product_ids) = {
            let mut state = self.state();

            if state.cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }

            if state
                .cart
                .iter()
                .any(|line| state.in_flight.contains(&line.product_id))
            {
                debug!(phase = %AttemptPhase::Idle, "duplicate submission dropped");
                return Err(CheckoutError::InFlight);
            }

            debug!(phase = %AttemptPhase::Validating, "validating request");
            customer.validate()?;

            let lines: Vec<CartLine> = state.cart.iter().cloned().collect();
            let product_ids: Vec<ProductId> =
                lines.iter().map(|line| line.product_id.clone()).collect();

            for id in &product_ids {
                state.in_flight.insert(id.clone());
            }

            (OrderDraft::from_lines(&lines, customer), product_ids)
        };

        debug!(phase = %AttemptPhase::Submitting, items = product_ids.len(), "submitting order");
        let result = self.orders.create_order(draft).await;

        let mut state = self.state();

        for id in &product_ids {
            state.in_flight.remove(id);
        }

        match result {
            Ok(receipt) => {
                state.cart.clear();
                state.ledger.clear_all();

                if let Err(error) = self.storage.clear() {
                    warn!(%error, "failed to clear cart snapshot");
                }

                debug!(phase = %AttemptPhase::Succeeded, "order accepted");

                Ok(receipt)
            }
            Err(error) => {
                debug!(phase = %AttemptPhase::RolledBack, %error, "order failed, cart left intact");

                Err(map_api_error(error))
            }
        }
    }
}
