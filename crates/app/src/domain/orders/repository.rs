//! Order Repository

use async_trait::async_trait;
use boutique::products::ProductId;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        checkout::Address,
        orders::models::{Order, OrderUuid, StatusPatch},
    },
    session::UserUuid,
    store::{Direction, Query, RestClient, StoreError},
};

const ORDER_COLUMNS: &str = "id, created_at, order_number, status, total_amount, \
    payment_status, tracking_number, \
    order_items (id, quantity, price_at_purchase, products (id, name, image_url))";

/// Orders and the procedures that create and change them.
#[automock]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// The user's orders, newest first, with lines and product summaries.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, StoreError>;

    /// Turn the caller's remote cart into an order and empty it. Returns the
    /// order number.
    async fn create_order(
        &self,
        shipping: &Address,
        billing: &Address,
    ) -> Result<String, StoreError>;

    /// Order a single product without touching the cart. Returns the order
    /// number.
    async fn create_order_single_item(
        &self,
        product: &ProductId,
        quantity: u32,
        shipping: &Address,
        billing: &Address,
    ) -> Result<String, StoreError>;

    /// Cancel an order. Returns the store's confirmation message, if any.
    async fn cancel_order(&self, order: OrderUuid) -> Result<Option<String>, StoreError>;

    async fn update_order_status(
        &self,
        order: OrderUuid,
        patch: &StatusPatch,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct RestOrderRepository {
    client: RestClient,
}

impl RestOrderRepository {
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderRepository for RestOrderRepository {
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, StoreError> {
        let query = Query::new()
            .select(ORDER_COLUMNS)
            .eq("user_id", user)
            .order("created_at", Direction::Desc);

        self.client.select("orders", &query).await
    }

    async fn create_order(
        &self,
        shipping: &Address,
        billing: &Address,
    ) -> Result<String, StoreError> {
        let args = CreateOrderArgs {
            shipping_address_json: shipping,
            billing_address_json: billing,
        };

        self.client
            .rpc::<_, OrderNumber>("create_order", &args)
            .await
            .map(OrderNumber::into_string)
    }

    async fn create_order_single_item(
        &self,
        product: &ProductId,
        quantity: u32,
        shipping: &Address,
        billing: &Address,
    ) -> Result<String, StoreError> {
        let args = SingleItemArgs {
            product_id_to_buy: product,
            quantity_to_buy: quantity,
            shipping_address_json: shipping,
            billing_address_json: billing,
        };

        self.client
            .rpc::<_, OrderNumber>("create_order_single_item", &args)
            .await
            .map(OrderNumber::into_string)
    }

    async fn cancel_order(&self, order: OrderUuid) -> Result<Option<String>, StoreError> {
        self.client
            .rpc("cancel_order", &CancelArgs {
                order_id_to_cancel: order,
            })
            .await
    }

    async fn update_order_status(
        &self,
        order: OrderUuid,
        patch: &StatusPatch,
    ) -> Result<(), StoreError> {
        let args = UpdateStatusArgs {
            order_id_to_update: order,
            new_status: patch.status.as_ref().map(|status| status.as_str()),
            new_payment_status: patch.payment_status.as_deref(),
            new_tracking_number: patch.tracking_number.as_deref(),
        };

        self.client.rpc_void("update_order_status", &args).await
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderArgs<'a> {
    shipping_address_json: &'a Address,
    billing_address_json: &'a Address,
}

#[derive(Debug, Serialize)]
struct SingleItemArgs<'a> {
    product_id_to_buy: &'a ProductId,
    quantity_to_buy: u32,
    shipping_address_json: &'a Address,
    billing_address_json: &'a Address,
}

#[derive(Debug, Serialize)]
struct CancelArgs {
    order_id_to_cancel: OrderUuid,
}

#[derive(Debug, Serialize)]
struct UpdateStatusArgs<'a> {
    order_id_to_update: OrderUuid,
    new_status: Option<&'a str>,
    new_payment_status: Option<&'a str>,
    new_tracking_number: Option<&'a str>,
}

/// Order number as returned by the procedures: text or a bare integer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderNumber {
    Text(String),
    Number(i64),
}

impl OrderNumber {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}
