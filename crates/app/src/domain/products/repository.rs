//! Product Repository

use async_trait::async_trait;
use boutique::products::{Product, ProductId};
use mockall::automock;

use crate::store::{Direction, Query, RestClient, StoreError};

const TABLE: &str = "products";

#[automock]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product, newest first.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct RestProductRepository {
    client: RestClient,
}

impl RestProductRepository {
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductRepository for RestProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let query = Query::new()
            .select("*")
            .order("created_at", Direction::Desc);

        self.client.select(TABLE, &query).await
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let query = Query::new().select("*").eq("id", id).limit(1);

        let products: Vec<Product> = self.client.select(TABLE, &query).await?;

        Ok(products.into_iter().next())
    }
}
