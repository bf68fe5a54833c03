//! Cart Repository

use std::num::NonZeroU32;

use async_trait::async_trait;
use boutique::products::ProductId;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    domain::carts::records::{CartItemUpsert, CartRecord, QuantityChange},
    session::UserUuid,
    store::{Query, RestClient, StoreError},
};

const TABLE: &str = "cart_items";

/// Remote cart rows, one per (user, product).
#[automock]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Every cart row of the user with its product embedded.
    async fn fetch_cart(&self, user: UserUuid) -> Result<Vec<CartRecord>, StoreError>;

    /// Insert or overwrite the user's row for `product`.
    async fn upsert_item(
        &self,
        user: UserUuid,
        product: &ProductId,
        quantity: NonZeroU32,
    ) -> Result<(), StoreError>;

    async fn update_quantity(
        &self,
        user: UserUuid,
        product: &ProductId,
        quantity: NonZeroU32,
    ) -> Result<(), StoreError>;

    async fn delete_item(&self, user: UserUuid, product: &ProductId) -> Result<(), StoreError>;

    /// Delete every row of the user.
    async fn clear(&self, user: UserUuid) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct RestCartRepository {
    client: RestClient,
}

impl RestCartRepository {
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    fn line(user: UserUuid, product: &ProductId) -> Query {
        Query::new().eq("user_id", user).eq("product_id", product)
    }
}

#[async_trait]
impl CartRepository for RestCartRepository {
    async fn fetch_cart(&self, user: UserUuid) -> Result<Vec<CartRecord>, StoreError> {
        let query = Query::new()
            .select("product_id, quantity, products (*)")
            .eq("user_id", user);

        self.client.select(TABLE, &query).await
    }

    async fn upsert_item(
        &self,
        user: UserUuid,
        product: &ProductId,
        quantity: NonZeroU32,
    ) -> Result<(), StoreError> {
        let row = CartItemUpsert {
            user_id: user,
            product_id: product,
            quantity: quantity.get(),
            updated_at: Timestamp::now(),
        };

        self.client
            .upsert(TABLE, &row, &["user_id", "product_id"])
            .await
    }

    async fn update_quantity(
        &self,
        user: UserUuid,
        product: &ProductId,
        quantity: NonZeroU32,
    ) -> Result<(), StoreError> {
        let change = QuantityChange {
            quantity: quantity.get(),
            updated_at: Timestamp::now(),
        };

        self.client
            .update(TABLE, &change, &Self::line(user, product))
            .await
    }

    async fn delete_item(&self, user: UserUuid, product: &ProductId) -> Result<(), StoreError> {
        self.client.delete(TABLE, &Self::line(user, product)).await
    }

    async fn clear(&self, user: UserUuid) -> Result<(), StoreError> {
        self.client
            .delete(TABLE, &Query::new().eq("user_id", user))
            .await
    }
}
