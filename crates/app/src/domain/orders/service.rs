//! Order history.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use boutique::view::ViewState;
use parking_lot::Mutex;
use tracing::{error, info, instrument};

use crate::{
    domain::orders::{
        OrdersError, OrderRepository,
        models::{Order, OrderUuid, StatusPatch},
    },
    guards::KeyedInFlight,
    session::CurrentUser,
    store::StoreError,
    ui::{Notification, Notifier},
};

/// The signed-in shopper's orders, re-fetched after every change.
pub struct OrderHistory {
    repository: Arc<dyn OrderRepository>,
    notifier: Arc<dyn Notifier>,
    orders: Mutex<ViewState<Vec<Order>>>,
    pending: KeyedInFlight<OrderUuid>,
}

impl OrderHistory {
    #[must_use]
    pub fn new(repository: Arc<dyn OrderRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
            orders: Mutex::new(ViewState::Loading),
            pending: KeyedInFlight::default(),
        }
    }

    /// Fetch the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// - [`OrdersError::AuthRequired`] without a signed-in user.
    /// - [`OrdersError::RemoteRejected`] when the fetch fails; the view keeps
    ///   the failure for a retry.
    #[instrument(skip_all)]
    pub async fn refresh(&self, user: Option<&CurrentUser>) -> Result<Vec<Order>, OrdersError> {
        let user = user.ok_or(OrdersError::AuthRequired)?;

        self.load(user).await.map_err(|source| {
            self.notify_failure("Failed to load orders", &source);

            OrdersError::RemoteRejected(source)
        })
    }

    /// Cancel an order and re-fetch the list.
    ///
    /// Returns the store's confirmation message. The store decides whether
    /// the order can still be cancelled.
    ///
    /// # Errors
    ///
    /// - [`OrdersError::AuthRequired`] without a signed-in user.
    /// - [`OrdersError::Busy`] while a cancel of the same order is running.
    /// - [`OrdersError::RemoteRejected`] when the store refuses; the list is
    ///   left as it was.
    #[instrument(skip(self, user), fields(order_id = %order))]
    pub async fn cancel(
        &self,
        user: Option<&CurrentUser>,
        order: OrderUuid,
    ) -> Result<String, OrdersError> {
        let Some(user) = user else {
            self.notifier
                .notify(Notification::error("Please log in to manage your orders."));
            return Err(OrdersError::AuthRequired);
        };

        let Some(_cancelling) = self.pending.try_begin(&order) else {
            return Err(OrdersError::Busy);
        };

        match self.repository.cancel_order(order).await {
            Ok(message) => {
                let message = message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "Order cancelled successfully".to_string());

                info!("order cancelled");
                self.notifier.notify(Notification::success(message.clone()));
                self.reload_quietly(user).await;

                Ok(message)
            }
            Err(source) => {
                error!(error = %source, "failed to cancel order");
                self.notify_failure("Failed to cancel order", &source);

                Err(OrdersError::RemoteRejected(source))
            }
        }
    }

    /// Change an order's status, payment status or tracking number, then
    /// re-fetch the list.
    ///
    /// # Errors
    ///
    /// - [`OrdersError::AuthRequired`] without a signed-in user.
    /// - [`OrdersError::Busy`] while another change of the same order is
    ///   running.
    /// - [`OrdersError::RemoteRejected`] when the store refuses.
    #[instrument(skip(self, user, patch), fields(order_id = %order))]
    pub async fn update_status(
        &self,
        user: Option<&CurrentUser>,
        order: OrderUuid,
        patch: &StatusPatch,
    ) -> Result<(), OrdersError> {
        let Some(user) = user else {
            self.notifier
                .notify(Notification::error("Please log in to manage your orders."));
            return Err(OrdersError::AuthRequired);
        };

        let Some(_updating) = self.pending.try_begin(&order) else {
            return Err(OrdersError::Busy);
        };

        match self.repository.update_order_status(order, patch).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("Order status updated"));
                self.reload_quietly(user).await;

                Ok(())
            }
            Err(source) => {
                error!(error = %source, "failed to update order status");
                self.notify_failure("Failed to update order status", &source);

                Err(OrdersError::RemoteRejected(source))
            }
        }
    }

    /// Last fetched list, or why it could not be fetched.
    pub fn orders(&self) -> ViewState<Vec<Order>> {
        self.orders.lock().clone()
    }

    pub fn is_pending(&self, order: &OrderUuid) -> bool {
        self.pending.is_active(order)
    }

    /// Forget the list, e.g. after signing out.
    pub fn reset(&self) {
        *self.orders.lock() = ViewState::Loading;
    }

    async fn load(&self, user: &CurrentUser) -> Result<Vec<Order>, StoreError> {
        *self.orders.lock() = ViewState::Loading;

        let result = self.repository.list_orders(user.id).await;

        if let Err(source) = &result {
            error!(error = %source, "failed to load orders");
        }

        *self.orders.lock() = match &result {
            Ok(orders) => ViewState::Ready(orders.clone()),
            Err(source) => ViewState::Failed {
                message: source.user_message(),
            },
        };

        result
    }

    /// Re-fetch after a change. The change has already been reported, so a
    /// failed fetch only shows up in the view state.
    async fn reload_quietly(&self, user: &CurrentUser) {
        if self.load(user).await.is_err() {
            info!("order list left in failed state after change");
        }
    }

    fn notify_failure(&self, title: &str, source: &StoreError) {
        self.notifier
            .notify(Notification::error(title).with_description(source.user_message()));
    }
}

impl Debug for OrderHistory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OrderHistory")
            .field("orders", &*self.orders.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::orders::{MockOrderRepository, models::OrderStatus},
        test::{TestContext, order},
        ui::{MockNotifier, Severity},
    };

    use super::*;

    #[tokio::test]
    async fn refresh_lists_orders_newest_first() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        let older = ctx.store.seed_order(ctx.user.id, order("1001", OrderStatus::Delivered));
        let newer = ctx.store.seed_order(ctx.user.id, order("1002", OrderStatus::Pending));

        let orders = ctx.orders.refresh(Some(&ctx.user)).await?;

        let ids: Vec<OrderUuid> = orders.iter().map(|order| order.id).collect();
        assert_eq!(ids, [newer, older]);
        assert_eq!(ctx.orders.orders().data().map(Vec::len), Some(2));

        Ok(())
    }

    #[tokio::test]
    async fn refresh_without_user_is_auth_required() {
        let ctx = TestContext::new();

        let result = ctx.orders.refresh(None).await;

        assert!(
            matches!(result, Err(OrdersError::AuthRequired)),
            "expected AuthRequired, got {result:?}"
        );
        assert_eq!(ctx.store.calls(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_retryable_error() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        ctx.store.fail_next("permission denied for table orders");

        let result = ctx.orders.refresh(Some(&ctx.user)).await;

        assert!(result.is_err(), "refresh should fail");
        let view = ctx.orders.orders();
        assert!(view.is_retryable());
        assert_eq!(view.error(), Some("permission denied for table orders"));
        assert_eq!(ctx.notifier.titles(), ["Failed to load orders"]);

        Ok(())
    }

    #[tokio::test]
    async fn cancelling_pending_order_refetches_list() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        let id = ctx.store.seed_order(ctx.user.id, order("1042", OrderStatus::Pending));
        ctx.orders.refresh(Some(&ctx.user)).await?;

        let message = ctx.orders.cancel(Some(&ctx.user), id).await?;

        assert_eq!(message, "Order cancelled successfully");
        let statuses: Vec<OrderStatus> = ctx
            .orders
            .orders()
            .data()
            .map(|orders| orders.iter().map(|o| o.status.clone()).collect())
            .unwrap_or_default();
        assert_eq!(statuses, [OrderStatus::Cancelled]);
        assert_eq!(ctx.notifier.titles(), ["Order cancelled successfully"]);

        Ok(())
    }

    #[tokio::test]
    async fn cancelling_shipped_order_is_rejected_and_list_unchanged() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        let id = ctx.store.seed_order(ctx.user.id, order("1042", OrderStatus::Shipped));
        let before = ctx.orders.refresh(Some(&ctx.user)).await?;
        let calls = ctx.store.calls();

        let result = ctx.orders.cancel(Some(&ctx.user), id).await;

        assert!(
            matches!(result, Err(OrdersError::RemoteRejected(_))),
            "expected RemoteRejected, got {result:?}"
        );
        assert_eq!(ctx.orders.orders().data(), Some(&before));
        assert_eq!(ctx.store.calls(), calls + 1, "only the cancel call is made");

        let notifications = ctx.notifier.all();
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications.first().map(|n| (n.severity, n.title.as_str())),
            Some((Severity::Error, "Failed to cancel order"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_uses_store_message_when_given() -> TestResult {
        let user = CurrentUser::new(crate::session::UserUuid::new());
        let id = OrderUuid::new();

        let mut repository = MockOrderRepository::new();
        repository
            .expect_cancel_order()
            .times(1)
            .returning(|_| Ok(Some("Order #1042 cancelled.".to_string())));
        repository
            .expect_list_orders()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.title == "Order #1042 cancelled." && !n.is_error())
            .times(1)
            .return_const(());

        let history = OrderHistory::new(Arc::new(repository), Arc::new(notifier));
        let message = history.cancel(Some(&user), id).await?;

        assert_eq!(message, "Order #1042 cancelled.");

        Ok(())
    }

    #[tokio::test]
    async fn update_status_notifies_and_refetches() -> TestResult {
        let ctx = TestContext::signed_in().await?;
        let id = ctx.store.seed_order(ctx.user.id, order("1042", OrderStatus::Processing));

        let patch = StatusPatch {
            status: Some(OrderStatus::Shipped),
            tracking_number: Some("1Z999".to_string()),
            ..StatusPatch::default()
        };
        ctx.orders.update_status(Some(&ctx.user), id, &patch).await?;

        let updated = ctx
            .orders
            .orders()
            .data()
            .and_then(|orders| orders.first().cloned())
            .ok_or("expected a refetched order")?;
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.tracking_number.as_deref(), Some("1Z999"));
        assert_eq!(ctx.notifier.titles(), ["Order status updated"]);

        Ok(())
    }
}
