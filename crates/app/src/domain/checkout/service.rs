//! Order placement.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    num::NonZeroU32,
    sync::Arc,
};

use boutique::products::ProductId;
use tracing::{error, info, instrument, warn};

use crate::{
    domain::{
        carts::CartSync,
        checkout::{Address, CheckoutError},
        orders::OrderRepository,
        profiles::ProfileRepository,
    },
    guards::InFlight,
    session::CurrentUser,
    store::StoreError,
    ui::{Navigator, Notification, Notifier, Route},
};

/// Where the shipping address comes from when the caller gives none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressPolicy {
    /// Fall back to a stand-in address when the profile has none.
    pub allow_placeholder: bool,
}

/// Turns the cart, or a single product, into an order.
pub struct Checkout {
    orders: Arc<dyn OrderRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    policy: AddressPolicy,
    checking_out: InFlight,
    buying: InFlight,
}

impl Checkout {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        policy: AddressPolicy,
    ) -> Self {
        Self {
            orders,
            profiles,
            notifier,
            navigator,
            policy,
            checking_out: InFlight::default(),
            buying: InFlight::default(),
        }
    }

    /// Place an order for everything in the cart. Returns the order number.
    ///
    /// On success the local cart is emptied and the shopper is sent to the
    /// confirmation page. On failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Busy`] while another checkout is running.
    /// - [`CheckoutError::AuthRequired`] without a signed-in user; the shopper
    ///   is sent to sign in.
    /// - [`CheckoutError::EmptyCart`] when there is nothing to order.
    /// - [`CheckoutError::AddressRequired`] when no address can be resolved.
    /// - [`CheckoutError::RemoteRejected`] when the store refuses the order.
    #[instrument(skip_all)]
    pub async fn checkout_cart(
        &self,
        cart: &CartSync,
        address: Option<Address>,
    ) -> Result<String, CheckoutError> {
        let Some(_checking_out) = self.checking_out.try_begin() else {
            return Err(CheckoutError::Busy);
        };

        let user = self.require_user(cart.user())?;

        if cart.is_empty() {
            self.notifier
                .notify(Notification::error("Your cart is empty."));
            return Err(CheckoutError::EmptyCart);
        }

        let shipping = self.resolve_address(&user, address).await?;

        let result = self.orders.create_order(&shipping, &shipping).await;

        self.finish(result, || cart.reset_after_order())
    }

    /// Order `quantity` units of one product without touching the cart.
    /// Returns the order number.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Busy`] while another buy-now is running.
    /// - [`CheckoutError::AuthRequired`] without a signed-in user; the shopper
    ///   is sent to sign in.
    /// - [`CheckoutError::AddressRequired`] when no address can be resolved.
    /// - [`CheckoutError::RemoteRejected`] when the store refuses the order.
    #[instrument(skip(self, user, address), fields(product_id = %product_id))]
    pub async fn buy_now(
        &self,
        user: Option<CurrentUser>,
        product_id: &ProductId,
        quantity: NonZeroU32,
        address: Option<Address>,
    ) -> Result<String, CheckoutError> {
        let Some(_buying) = self.buying.try_begin() else {
            return Err(CheckoutError::Busy);
        };

        let user = self.require_user(user)?;
        let shipping = self.resolve_address(&user, address).await?;

        let result = self
            .orders
            .create_order_single_item(product_id, quantity.get(), &shipping, &shipping)
            .await;

        self.finish(result, || ())
    }

    pub fn is_checking_out(&self) -> bool {
        self.checking_out.is_active()
    }

    pub fn is_buying(&self) -> bool {
        self.buying.is_active()
    }

    fn require_user(&self, user: Option<CurrentUser>) -> Result<CurrentUser, CheckoutError> {
        user.ok_or_else(|| {
            self.navigator.navigate(Route::Auth);
            self.notifier
                .notify(Notification::error("Please log in to check out."));

            CheckoutError::AuthRequired
        })
    }

    /// Explicit address, then the first saved address, then the stand-in
    /// address when allowed.
    async fn resolve_address(
        &self,
        user: &CurrentUser,
        address: Option<Address>,
    ) -> Result<Address, CheckoutError> {
        if let Some(address) = address {
            return self.complete_or_reject(address);
        }

        match self.profiles.shipping_addresses(user.id).await {
            Ok(addresses) => {
                if let Some(address) = addresses.into_iter().next() {
                    return Ok(address);
                }
            }
            Err(source) => warn!(error = %source, "could not read saved addresses"),
        }

        if self.policy.allow_placeholder {
            info!("using placeholder shipping address");

            let name = user.email.clone().unwrap_or_else(|| "Customer".to_string());
            return Ok(Address::placeholder(name));
        }

        self.address_required()
    }

    fn complete_or_reject(&self, address: Address) -> Result<Address, CheckoutError> {
        if address.is_complete() {
            Ok(address)
        } else {
            self.address_required()
        }
    }

    fn address_required(&self) -> Result<Address, CheckoutError> {
        self.notifier.notify(
            Notification::error("Checkout Failed")
                .with_description("Add a shipping address to place your order."),
        );

        Err(CheckoutError::AddressRequired)
    }

    fn finish(
        &self,
        result: Result<String, StoreError>,
        on_success: impl FnOnce(),
    ) -> Result<String, CheckoutError> {
        match result {
            Ok(order_number) => {
                info!(%order_number, "order placed");

                self.notifier.notify(
                    Notification::success("Order placed successfully!").with_description(
                        format!("Your order #{order_number} is being processed."),
                    ),
                );
                on_success();
                self.navigator
                    .navigate(Route::OrderConfirmation(order_number.clone()));

                Ok(order_number)
            }
            Err(source) => {
                error!(error = %source, "checkout failed");

                self.notifier.notify(
                    Notification::error("Checkout Failed").with_description(source.user_message()),
                );

                Err(CheckoutError::RemoteRejected(source))
            }
        }
    }
}

impl Debug for Checkout {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Checkout")
            .field("policy", &self.policy)
            .field("checking_out", &self.checking_out)
            .field("buying", &self.buying)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartRecord, MockCartRepository},
            orders::MockOrderRepository,
            profiles::MockProfileRepository,
        },
        session::UserUuid,
        test::{TestContext, product, qty},
        ui::{MockNavigator, MockNotifier, Severity},
    };

    use super::*;

    fn address(city: &str) -> Address {
        Address {
            name: "Ada".to_string(),
            line1: "1 Loop Rd".to_string(),
            line2: None,
            city: city.to_string(),
            state: None,
            postal_code: "LS1".to_string(),
            country: "GB".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_cart_checkout_makes_no_remote_call_and_no_navigation() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        let calls = ctx.store.calls();

        let result = ctx.checkout.checkout_cart(&ctx.cart, Some(address("Leeds"))).await;

        assert!(
            matches!(result, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
        assert_eq!(ctx.store.calls(), calls);
        assert!(ctx.navigator.routes().is_empty());
        assert_eq!(ctx.notifier.titles(), ["Your cart is empty."]);

        Ok(())
    }

    #[tokio::test]
    async fn successful_checkout_clears_cart_and_navigates() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        ctx.cart.add_to_cart(&product("tote", 120), qty(2)).await?;
        ctx.store.next_order_number("1042");

        let number = ctx.checkout.checkout_cart(&ctx.cart, Some(address("Leeds"))).await?;

        assert_eq!(number, "1042");
        assert!(ctx.cart.is_empty());
        assert_eq!(ctx.store.cart_len(ctx.user.id), 0);
        assert_eq!(
            ctx.navigator.routes(),
            [Route::OrderConfirmation("1042".to_string())]
        );

        let last = ctx.notifier.last().ok_or("expected a notification")?;
        assert_eq!(last.title, "Order placed successfully!");
        assert_eq!(
            last.description.as_deref(),
            Some("Your order #1042 is being processed.")
        );

        let placed = ctx.store.orders_for(ctx.user.id);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed.first().map(|o| o.item_count()), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_without_user_sends_to_sign_in() {
        let ctx = TestContext::new();

        let result = ctx.checkout.checkout_cart(&ctx.cart, None).await;

        assert!(
            matches!(result, Err(CheckoutError::AuthRequired)),
            "expected AuthRequired, got {result:?}"
        );
        assert_eq!(ctx.navigator.routes(), [Route::Auth]);
        assert_eq!(ctx.notifier.titles(), ["Please log in to check out."]);
        assert_eq!(ctx.store.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_checkout_keeps_cart() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        ctx.cart.add_to_cart(&product("tote", 120), qty(2)).await?;
        ctx.store.fail_next("insufficient stock for Tote");

        let result = ctx.checkout.checkout_cart(&ctx.cart, Some(address("Leeds"))).await;

        assert!(
            matches!(result, Err(CheckoutError::RemoteRejected(_))),
            "expected RemoteRejected, got {result:?}"
        );
        assert_eq!(ctx.cart.total_items(), 2);
        assert!(ctx.navigator.routes().is_empty());

        let last = ctx.notifier.last().ok_or("expected a notification")?;
        assert_eq!((last.severity, last.title.as_str()), (Severity::Error, "Checkout Failed"));
        assert_eq!(last.description.as_deref(), Some("insufficient stock for Tote"));

        Ok(())
    }

    #[tokio::test]
    async fn saved_address_is_used_when_none_given() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        ctx.store.seed_addresses(ctx.user.id, vec![address("York"), address("Leeds")]);
        ctx.cart.add_to_cart(&product("tote", 120), qty(1)).await?;

        ctx.checkout.checkout_cart(&ctx.cart, None).await?;

        assert_eq!(
            ctx.store.last_shipping_address().map(|a| a.city),
            Some("York".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn missing_address_is_required_unless_placeholder_allowed() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        ctx.cart.add_to_cart(&product("tote", 120), qty(1)).await?;
        let calls = ctx.store.calls();

        let result = ctx.checkout.checkout_cart(&ctx.cart, None).await;

        assert!(
            matches!(result, Err(CheckoutError::AddressRequired)),
            "expected AddressRequired, got {result:?}"
        );
        assert_eq!(ctx.store.calls(), calls + 1, "only the profile lookup is made");
        assert_eq!(ctx.cart.total_items(), 1);

        let lenient = TestContext::with_policy(AddressPolicy {
            allow_placeholder: true,
        });
        lenient.cart.set_user(Some(lenient.user.clone())).await?;
        lenient.cart.add_to_cart(&product("tote", 120), qty(1)).await?;

        lenient.checkout.checkout_cart(&lenient.cart, None).await?;

        let used = lenient.store.last_shipping_address().ok_or("expected an order")?;
        assert_eq!(used, Address::placeholder("shopper@example.com"));

        Ok(())
    }

    #[tokio::test]
    async fn buy_now_leaves_cart_alone() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        let tote = product("tote", 120);
        ctx.store.seed_product(product("scarf", 40));
        ctx.cart.add_to_cart(&tote, qty(1)).await?;
        ctx.store.next_order_number("2001");

        let number = ctx
            .checkout
            .buy_now(
                Some(ctx.user.clone()),
                &ProductId::new("scarf"),
                qty(3),
                Some(address("Leeds")),
            )
            .await?;

        assert_eq!(number, "2001");
        assert_eq!(ctx.cart.total_items(), 1);
        assert_eq!(ctx.store.cart_quantity(ctx.user.id, &tote.id), Some(1));
        assert_eq!(
            ctx.navigator.routes(),
            [Route::OrderConfirmation("2001".to_string())]
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_checkout_is_busy() -> TestResult {
        let user = CurrentUser::new(UserUuid::new());

        let mut carts = MockCartRepository::new();
        carts
            .expect_fetch_cart()
            .returning(|_| Ok(vec![CartRecord::new(product("tote", 120), 1)]));

        let mut orders = MockOrderRepository::new();
        orders.expect_create_order().times(1).returning(|_, _| Ok("1".to_string()));

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_shipping_addresses()
            .returning(|_| Ok(vec![address("Leeds")]));

        let mut notifier = MockNotifier::new();
        notifier.expect_notify().return_const(());
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().return_const(());
        let notifier: Arc<dyn Notifier> = Arc::new(notifier);

        let cart = CartSync::new(Arc::new(carts), Arc::clone(&notifier));
        cart.set_user(Some(user)).await?;

        let checkout = Checkout::new(
            Arc::new(orders),
            Arc::new(profiles),
            notifier,
            Arc::new(navigator),
            AddressPolicy::default(),
        );

        let guard = checkout.checking_out.try_begin();
        assert!(guard.is_some(), "simulated first checkout should claim the flag");

        let result = checkout.checkout_cart(&cart, None).await;
        assert!(
            matches!(result, Err(CheckoutError::Busy)),
            "expected Busy, got {result:?}"
        );
        assert!(checkout.is_checking_out());

        drop(guard);

        let number = checkout.checkout_cart(&cart, None).await?;
        assert_eq!(number, "1");
        assert!(!checkout.is_checking_out());

        Ok(())
    }
}
