//! Cart synchronization.
//!
//! The local cart is updated first and mirrored to the store afterwards; a
//! rejected write puts the affected line back the way it was. Every mutation
//! ends in exactly one notification.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    num::NonZeroU32,
    sync::Arc,
};

use boutique::{
    cart::{Cart, CartItem, LineSnapshot},
    pricing::OrderSummary,
    products::{Product, ProductId},
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, error, instrument, warn};

use crate::{
    domain::carts::{CartError, CartRecord, CartRepository},
    guards::{KeyedInFlight, LineLocks},
    session::{CurrentUser, UserUuid},
    store::StoreError,
    ui::{Notification, Notifier},
};

#[derive(Debug, Default)]
struct CartState {
    user: Option<CurrentUser>,
    cart: Cart,
    loading: bool,
    generation: u64,
    epoch: u64,
}

/// When a local edit was made: the session it belongs to and how many
/// times the cart has been emptied since that session began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    generation: u64,
    epoch: u64,
}

impl CartState {
    fn stamp(&self) -> Stamp {
        Stamp {
            generation: self.generation,
            epoch: self.epoch,
        }
    }

    /// Empty the cart, invalidating every rollback taken before.
    fn empty(&mut self) -> Vec<CartItem> {
        self.epoch += 1;
        self.cart.clear()
    }
}

/// Owns the signed-in shopper's cart and keeps it in step with the store.
pub struct CartSync {
    repository: Arc<dyn CartRepository>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CartState>,
    lines: LineLocks<ProductId>,
    adding: KeyedInFlight<ProductId>,
}

impl CartSync {
    #[must_use]
    pub fn new(repository: Arc<dyn CartRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
            state: Mutex::new(CartState::default()),
            lines: LineLocks::default(),
            adding: KeyedInFlight::default(),
        }
    }

    /// Switch to `user` and load their cart. Signing out empties the cart
    /// without touching the store.
    ///
    /// A load that completes after another switch is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::RemoteRejected`] when the cart cannot be fetched;
    /// the cart is left empty.
    #[instrument(skip_all, fields(user = ?user.as_ref().map(|u| u.id)))]
    pub async fn set_user(&self, user: Option<CurrentUser>) -> Result<(), CartError> {
        let generation = {
            let mut state = self.state.lock();

            state.generation += 1;
            state.cart = Cart::new();
            state.loading = user.is_some();
            state.user.clone_from(&user);

            state.generation
        };

        let Some(user) = user else {
            return Ok(());
        };

        let result = self.repository.fetch_cart(user.id).await;

        let result = {
            let mut state = self.state.lock();

            if state.generation != generation {
                debug!("discarding cart loaded for a previous session");
                return Ok(());
            }

            state.loading = false;

            result.map(|records| state.cart = Cart::from_items(usable_lines(records)))
        };

        result.map_err(|source| {
            error!(error = %source, "failed to fetch cart");
            self.notify_failure("Failed to fetch your cart", &source);

            CartError::RemoteRejected(source)
        })
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::Busy`] while the same product is still being added.
    ///   Nothing is sent to the store.
    /// - [`CartError::AuthRequired`] without a signed-in user.
    /// - [`CartError::RemoteRejected`] when the store refuses the write; the
    ///   line is restored.
    #[instrument(skip_all, fields(product_id = %product.id, quantity = quantity.get()))]
    pub async fn add_to_cart(
        &self,
        product: &Product,
        quantity: NonZeroU32,
    ) -> Result<(), CartError> {
        let Some(_adding) = self.adding.try_begin(&product.id) else {
            self.notifier.notify(
                Notification::error("Failed to add item to cart")
                    .with_description("This item is already being added."),
            );
            return Err(CartError::Busy);
        };

        let _line = self.lines.lock(&product.id).await;

        let Some((user, stamp, (target, snapshot))) = self.edit(|cart| {
            let target = cart.quantity_after_add(&product.id, quantity);
            (target, cart.put(product, target))
        }) else {
            return Err(self.auth_required("Please log in to add items to your cart."));
        };

        match self.repository.upsert_item(user, &product.id, target).await {
            Ok(()) => {
                self.notifier.notify(
                    Notification::success("Added to cart!").with_description(product.name.clone()),
                );

                Ok(())
            }
            Err(source) => {
                error!(error = %source, "failed to add item to cart");
                self.rollback(stamp, snapshot);
                self.notify_failure("Failed to add item to cart", &source);

                Err(CartError::RemoteRejected(source))
            }
        }
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::AuthRequired`] without a signed-in user.
    /// - [`CartError::QuantityTooLarge`] above `u32::MAX` units; nothing is
    ///   sent to the store.
    /// - [`CartError::NotFound`] when the product has no line; nothing is
    ///   sent to the store.
    /// - [`CartError::RemoteRejected`] when the store refuses the write; the
    ///   previous quantity is restored unless the cart was emptied meanwhile.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove(product_id).await;
        }

        let Some(quantity) = u32::try_from(quantity).ok().and_then(NonZeroU32::new) else {
            warn!(quantity, "requested quantity out of range");
            self.notifier.notify(
                Notification::error("Failed to update quantity")
                    .with_description("That quantity is too large."),
            );

            return Err(CartError::QuantityTooLarge(quantity));
        };

        let _line = self.lines.lock(product_id).await;

        let Some((user, stamp, snapshot)) =
            self.edit(|cart| cart.set_quantity(product_id, quantity))
        else {
            return Err(self.auth_required("Please log in to update your cart."));
        };

        let Some(snapshot) = snapshot else {
            warn!("quantity change for a product that is not in the cart");
            self.notifier.notify(
                Notification::error("Failed to update quantity")
                    .with_description("This item is no longer in your cart."),
            );

            return Err(CartError::NotFound);
        };

        match self
            .repository
            .update_quantity(user, product_id, quantity)
            .await
        {
            Ok(()) => {
                self.notifier.notify(Notification::success("Cart updated"));

                Ok(())
            }
            Err(source) => {
                error!(error = %source, "failed to update quantity");
                self.rollback(stamp, snapshot);
                self.notify_failure("Failed to update quantity", &source);

                Err(CartError::RemoteRejected(source))
            }
        }
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// - [`CartError::AuthRequired`] without a signed-in user.
    /// - [`CartError::NotFound`] when the product has no line; nothing is
    ///   sent to the store.
    /// - [`CartError::RemoteRejected`] when the store refuses the delete; the
    ///   line is put back in its previous position unless the cart was
    ///   emptied meanwhile.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<(), CartError> {
        let _line = self.lines.lock(product_id).await;

        let Some((user, stamp, snapshot)) = self.edit(|cart| cart.remove(product_id)) else {
            return Err(self.auth_required("Please log in to update your cart."));
        };

        if !snapshot.existed() {
            warn!("removal of a product that is not in the cart");
            self.notifier.notify(
                Notification::error("Failed to remove item")
                    .with_description("This item is no longer in your cart."),
            );

            return Err(CartError::NotFound);
        }

        match self.repository.delete_item(user, product_id).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("Item removed from cart"));

                Ok(())
            }
            Err(source) => {
                error!(error = %source, "failed to remove item");
                self.rollback(stamp, snapshot);
                self.notify_failure("Failed to remove item", &source);

                Err(CartError::RemoteRejected(source))
            }
        }
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::AuthRequired`] without a signed-in user.
    /// - [`CartError::RemoteRejected`] when the store refuses the delete; lines
    ///   not re-added in the meantime are restored.
    ///
    /// Rollbacks of line changes still in flight are dropped, so a late
    /// failure cannot bring back a line that was cleared.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        let Some((user, previous, stamp)) = self.empty_for_user() else {
            return Err(self.auth_required("Please log in to update your cart."));
        };

        match self.repository.clear(user).await {
            Ok(()) => {
                self.notifier.notify(Notification::success("Cart cleared"));

                Ok(())
            }
            Err(source) => {
                error!(error = %source, "failed to clear cart");

                {
                    let mut state = self.state.lock();
                    if state.stamp() == stamp {
                        state.cart.restore_missing(previous);
                    }
                }

                self.notify_failure("Failed to clear cart", &source);

                Err(CartError::RemoteRejected(source))
            }
        }
    }

    /// Forget the local lines after an order was placed. The store clears
    /// its rows as part of order creation.
    pub fn reset_after_order(&self) {
        self.state.lock().empty();
    }

    /// Current lines in insertion order.
    pub fn items(&self) -> Vec<CartItem> {
        self.state.lock().cart.items().to_vec()
    }

    /// Copy of the current cart.
    pub fn cart(&self) -> Cart {
        self.state.lock().cart.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().cart.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn user(&self) -> Option<CurrentUser> {
        self.state.lock().user.clone()
    }

    pub fn total_items(&self) -> u64 {
        self.state.lock().cart.total_items()
    }

    pub fn total_price(&self) -> Decimal {
        self.state.lock().cart.total_price()
    }

    /// Subtotal, shipping, tax and total for the current lines.
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::for_cart(&self.state.lock().cart)
    }

    pub fn is_adding(&self, product_id: &ProductId) -> bool {
        self.adding.is_active(product_id)
    }

    /// Apply `change` to the cart of the signed-in user. `None` when nobody
    /// is signed in.
    fn edit<R>(&self, change: impl FnOnce(&mut Cart) -> R) -> Option<(UserUuid, Stamp, R)> {
        let mut state = self.state.lock();
        let user = state.user.as_ref()?.id;
        let stamp = state.stamp();

        Some((user, stamp, change(&mut state.cart)))
    }

    /// Empty the signed-in user's cart. The stamp is taken after emptying.
    fn empty_for_user(&self) -> Option<(UserUuid, Vec<CartItem>, Stamp)> {
        let mut state = self.state.lock();
        let user = state.user.as_ref()?.id;
        let previous = state.empty();

        Some((user, previous, state.stamp()))
    }

    /// Undo a line edit, unless the session changed or the cart was emptied
    /// since the edit was made.
    fn rollback(&self, stamp: Stamp, snapshot: LineSnapshot) {
        let mut state = self.state.lock();

        if state.stamp() == stamp {
            state.cart.restore(snapshot);
        } else {
            debug!("dropping rollback for an emptied or replaced cart");
        }
    }

    fn auth_required(&self, message: &str) -> CartError {
        self.notifier.notify(Notification::error(message));

        CartError::AuthRequired
    }

    fn notify_failure(&self, title: &str, source: &StoreError) {
        self.notifier
            .notify(Notification::error(title).with_description(source.user_message()));
    }
}

impl Debug for CartSync {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSync")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

fn usable_lines(records: Vec<CartRecord>) -> impl Iterator<Item = CartItem> {
    records.into_iter().filter_map(|record| {
        let product_id = record.product_id.clone();
        let quantity = record.quantity;
        let item = record.into_item();

        if item.is_none() {
            warn!(%product_id, quantity, "skipping unusable cart row");
        }

        item
    })
}
