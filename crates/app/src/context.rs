//! App Context

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, ConfigError},
    domain::{
        carts::{CartError, CartRepository, CartSync, RestCartRepository},
        checkout::{AddressPolicy, Checkout},
        orders::{OrderHistory, OrderRepository, RestOrderRepository},
        products::{Catalog, ProductRepository, RestProductRepository},
        profiles::{ProfileRepository, RestProfileRepository},
    },
    session::CurrentUser,
    store::{RestClient, StoreError},
    ui::{Navigator, Notifier},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build data service client")]
    Store(#[source] StoreError),
}

/// Persistence seams the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Repositories {
    /// Repositories backed by the hosted data service.
    pub fn rest(client: &RestClient) -> Self {
        Self {
            carts: Arc::new(RestCartRepository::new(client.clone())),
            orders: Arc::new(RestOrderRepository::new(client.clone())),
            products: Arc::new(RestProductRepository::new(client.clone())),
            profiles: Arc::new(RestProfileRepository::new(client.clone())),
        }
    }
}

impl Debug for Repositories {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// Services of one storefront session.
#[derive(Clone)]
pub struct AppContext {
    pub cart: Arc<CartSync>,
    pub checkout: Arc<Checkout>,
    pub orders: Arc<OrderHistory>,
    pub catalog: Arc<Catalog>,
    pub currency: &'static Currency,
}

impl AppContext {
    #[must_use]
    pub fn new(
        repositories: Repositories,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        policy: AddressPolicy,
        currency: &'static Currency,
    ) -> Self {
        Self {
            cart: Arc::new(CartSync::new(repositories.carts, Arc::clone(&notifier))),
            checkout: Arc::new(Checkout::new(
                repositories.orders.clone(),
                repositories.profiles,
                Arc::clone(&notifier),
                Arc::clone(&navigator),
                policy,
            )),
            orders: Arc::new(OrderHistory::new(
                repositories.orders,
                Arc::clone(&notifier),
            )),
            catalog: Arc::new(Catalog::new(repositories.products, notifier, navigator)),
            currency,
        }
    }

    /// Build the context against the configured data service.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection settings are missing or invalid,
    /// or the currency is unknown.
    pub fn from_config(
        config: &AppConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppInitError> {
        let currency = config.checkout.currency()?;
        let client =
            RestClient::new(config.store.rest_config()?).map_err(AppInitError::Store)?;

        Ok(Self::new(
            Repositories::rest(&client),
            notifier,
            navigator,
            config.checkout.address_policy(),
            currency,
        ))
    }

    /// Start a session for `user` and load their cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart cannot be fetched. The session is
    /// still started, with an empty cart.
    pub async fn sign_in(&self, user: CurrentUser) -> Result<(), CartError> {
        info!(user = %user.id, "signing in");

        self.orders.reset();
        self.cart.set_user(Some(user)).await
    }

    /// End the session, forgetting the cart and order list.
    pub async fn sign_out(&self) {
        info!("signing out");

        self.orders.reset();

        // Without a user nothing is fetched.
        if let Err(error) = self.cart.set_user(None).await {
            warn!(%error, "failed to clear session cart");
        }
    }

    pub fn user(&self) -> Option<CurrentUser> {
        self.cart.user()
    }
}

impl Debug for AppContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AppContext")
            .field("cart", &self.cart)
            .field("orders", &self.orders)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}
