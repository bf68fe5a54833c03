//! Catalog service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use boutique::{
    filters::{FilterSpec, filter_products},
    products::{Product, ProductId},
    view::ViewState,
};
use parking_lot::Mutex;
use tracing::{error, instrument};

use crate::{
    domain::products::{CatalogError, ProductRepository},
    ui::{Navigator, Notification, Notifier, Route},
};

/// Product listing and detail lookups.
pub struct Catalog {
    repository: Arc<dyn ProductRepository>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    products: Mutex<ViewState<Vec<Product>>>,
}

impl Catalog {
    #[must_use]
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            repository,
            notifier,
            navigator,
            products: Mutex::new(ViewState::Loading),
        }
    }

    /// Fetch every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::RemoteRejected`] when the fetch fails; the
    /// listing keeps the failure for a retry.
    #[instrument(skip_all)]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        *self.products.lock() = ViewState::Loading;

        match self.repository.list_products().await {
            Ok(products) => {
                *self.products.lock() = ViewState::Ready(products.clone());

                Ok(products)
            }
            Err(source) => {
                error!(error = %source, "failed to load products");

                let message = source.user_message();
                *self.products.lock() = ViewState::Failed {
                    message: message.clone(),
                };
                self.notifier
                    .notify(Notification::error("Failed to load products").with_description(message));

                Err(CatalogError::RemoteRejected(source))
            }
        }
    }

    /// Look up one product. When it cannot be shown the shopper is sent
    /// back to the product listing.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] when the store has no such product.
    /// - [`CatalogError::RemoteRejected`] when the lookup fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let error = match self.repository.get_product(id).await {
            Ok(Some(product)) => return Ok(product),
            Ok(None) => CatalogError::NotFound,
            Err(source) => {
                error!(error = %source, "failed to load product");
                CatalogError::RemoteRejected(source)
            }
        };

        self.notifier.notify(
            Notification::error("Product not found")
                .with_description("Redirecting you to all products."),
        );
        self.navigator.navigate(Route::Products);

        Err(error)
    }

    /// Last fetched listing, or why it could not be fetched.
    pub fn products(&self) -> ViewState<Vec<Product>> {
        self.products.lock().clone()
    }

    /// The fetched listing run through `spec`. Empty until a fetch succeeds.
    pub fn filtered(&self, spec: &FilterSpec) -> Vec<Product> {
        self.products
            .lock()
            .data()
            .map(|products| filter_products(products, spec))
            .unwrap_or_default()
    }
}

impl Debug for Catalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Catalog")
            .field("products", &*self.products.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use boutique::filters::SortBy;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::test::{TestContext, product};

    use super::*;

    #[tokio::test]
    async fn lists_products_newest_first_and_filters_them() -> TestResult {
        let ctx = TestContext::new();
        ctx.store.seed_product(product("old", 300));
        ctx.store.seed_product(product("mid", 50));
        ctx.store.seed_product(product("new", 120));

        let listed = ctx.catalog.list_products().await?;
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);

        let spec = FilterSpec::default()
            .with_price_range(Decimal::from(100), Decimal::from(500))
            .with_sort(SortBy::PriceLow);
        let filtered: Vec<String> = ctx
            .catalog
            .filtered(&spec)
            .into_iter()
            .map(|p| p.id.into_string())
            .collect();
        assert_eq!(filtered, ["new", "old"]);

        Ok(())
    }

    #[tokio::test]
    async fn failed_listing_is_retryable_and_notifies() {
        let ctx = TestContext::new();
        ctx.store.fail_next("service unavailable");

        let result = ctx.catalog.list_products().await;

        assert!(
            matches!(result, Err(CatalogError::RemoteRejected(_))),
            "expected RemoteRejected, got {result:?}"
        );
        assert!(ctx.catalog.products().is_retryable());
        assert!(ctx.catalog.filtered(&FilterSpec::default()).is_empty());
        assert_eq!(ctx.notifier.titles(), ["Failed to load products"]);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() -> TestResult {
        let ctx = TestContext::new();
        ctx.store.seed_product(product("tote", 120));

        let found = ctx.catalog.get_product(&ProductId::new("tote")).await?;
        assert_eq!(found.name, "Product tote");

        assert!(ctx.notifier.is_empty());

        let result = ctx.catalog.get_product(&ProductId::new("ghost")).await;
        assert!(
            matches!(result, Err(CatalogError::NotFound)),
            "expected NotFound, got {result:?}"
        );
        assert_eq!(ctx.notifier.titles(), ["Product not found"]);
        assert_eq!(ctx.navigator.routes(), [Route::Products]);

        Ok(())
    }
}
