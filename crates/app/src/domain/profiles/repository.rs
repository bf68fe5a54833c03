//! Profile Repository

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    domain::checkout::Address,
    session::UserUuid,
    store::{Query, RestClient, StoreError},
};

#[automock]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Saved shipping addresses of the user, most preferred first.
    async fn shipping_addresses(&self, user: UserUuid) -> Result<Vec<Address>, StoreError>;
}

#[derive(Debug, Clone)]
pub struct RestProfileRepository {
    client: RestClient,
}

impl RestProfileRepository {
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileRepository for RestProfileRepository {
    async fn shipping_addresses(&self, user: UserUuid) -> Result<Vec<Address>, StoreError> {
        let query = Query::new()
            .select("shipping_addresses")
            .eq("id", user)
            .limit(1);

        let rows: Vec<ProfileRow> = self.client.select("profiles", &query).await?;

        Ok(rows
            .into_iter()
            .next()
            .map(ProfileRow::into_addresses)
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    shipping_addresses: Option<Vec<Value>>,
}

impl ProfileRow {
    /// Saved addresses are free-form JSON; entries that are not addresses are
    /// skipped.
    fn into_addresses(self) -> Vec<Address> {
        self.shipping_addresses
            .unwrap_or_default()
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Address>(value) {
                Ok(address) if address.is_complete() => Some(address),
                Ok(_) => {
                    warn!("skipping incomplete saved address");
                    None
                }
                Err(error) => {
                    warn!(%error, "skipping malformed saved address");
                    None
                }
            })
            .collect()
    }
}
