//! Test context for service-level tests.

use std::{num::NonZeroU32, sync::Arc};

use boutique::products::Product;
use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::{
        carts::{CartError, CartSync},
        checkout::{AddressPolicy, Checkout},
        orders::{
            OrderHistory,
            models::{Order, OrderStatus, OrderUuid},
        },
        products::Catalog,
    },
    session::{CurrentUser, UserUuid},
};

mod ui;

pub use store::InMemoryStore;
pub use ui::{RecordingNavigator, RecordingNotifier};

/// Services wired to one in-memory store, acting for `user`.
pub struct TestContext {
    pub user: CurrentUser,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub cart: CartSync,
    pub checkout: Checkout,
    pub orders: OrderHistory,
    pub catalog: Catalog,
}

impl TestContext {
    /// Context with nobody signed in yet.
    pub fn new() -> Self {
        Self::with_policy(AddressPolicy::default())
    }

    pub fn with_policy(policy: AddressPolicy) -> Self {
        let user = CurrentUser::new(UserUuid::new()).with_email("shopper@example.com");
        let store = Arc::new(InMemoryStore::new(user.id));
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());

        Self {
            cart: CartSync::new(store.clone(), notifier.clone()),
            checkout: Checkout::new(
                store.clone(),
                store.clone(),
                notifier.clone(),
                navigator.clone(),
                policy,
            ),
            orders: OrderHistory::new(store.clone(), notifier.clone()),
            catalog: Catalog::new(store.clone(), notifier.clone(), navigator.clone()),
            user,
            store,
            notifier,
            navigator,
        }
    }

    /// Context with `user` signed in and their (empty) cart loaded.
    pub async fn signed_in() -> Result<Self, CartError> {
        let ctx = Self::new();
        ctx.cart.set_user(Some(ctx.user.clone())).await?;

        Ok(ctx)
    }
}

pub fn product(id: &str, price: i64) -> Product {
    Product::new(id, format!("Product {id}"), "Bags", Decimal::from(price))
}

pub fn qty(quantity: u32) -> NonZeroU32 {
    NonZeroU32::new(quantity).unwrap_or(NonZeroU32::MIN)
}

pub fn order(number: &str, status: OrderStatus) -> Order {
    Order {
        id: OrderUuid::new(),
        created_at: Timestamp::now(),
        order_number: number.to_string(),
        status,
        total_amount: Decimal::ZERO,
        payment_status: None,
        tracking_number: None,
        items: Vec::new(),
    }
}
