//! REST client for the hosted data service.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use super::{Query, StoreError};

/// Connection settings for the data service.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project URL, e.g. `"https://abc.supabase.co"`.
    pub url: String,

    /// Public API key sent as `apikey` on every request.
    pub api_key: String,

    /// Signed-in user's access token. Falls back to the API key.
    pub access_token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client speaking the data service's REST dialect.
#[derive(Debug, Clone)]
pub struct RestClient {
    base: String,
    api_key: String,
    bearer: String,
    http: Client,
}

impl RestClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is not absolute http(s) or the HTTP
    /// client cannot be built.
    pub fn new(config: RestConfig) -> Result<Self, StoreError> {
        let url = Url::parse(&config.url)
            .map_err(|error| StoreError::InvalidUrl(format!("{}: {error}", config.url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(config.url));
        }

        let http = Client::builder().timeout(config.timeout).build()?;
        let bearer = config
            .access_token
            .unwrap_or_else(|| config.api_key.clone());

        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key,
            bearer,
            http,
        })
    }

    /// Fetch rows of `table` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx answer, or rows
    /// that do not decode into `T`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        debug!(table, "select");

        let response = self
            .request(Method::GET, &self.table_url(table))
            .query(&query.to_pairs())
            .send()
            .await?;

        decode(Self::check(response).await?).await
    }

    /// Insert `row`, merging into the existing row on a `conflict` key
    /// collision.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx answer.
    pub async fn upsert<B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
        conflict: &[&str],
    ) -> Result<(), StoreError> {
        debug!(table, on_conflict = ?conflict, "upsert");

        let response = self
            .request(Method::POST, &self.table_url(table))
            .query(&[("on_conflict", conflict.join(","))])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;

        Self::check(response).await.map(drop)
    }

    /// Patch every row matching `query` with `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unfiltered query, on transport failure or a
    /// non-2xx answer.
    pub async fn update<B: Serialize + Sync>(
        &self,
        table: &str,
        changes: &B,
        query: &Query,
    ) -> Result<(), StoreError> {
        Self::require_filter("update", table, query)?;
        debug!(table, "update");

        let response = self
            .request(Method::PATCH, &self.table_url(table))
            .query(&query.to_pairs())
            .header("Prefer", "return=minimal")
            .json(changes)
            .send()
            .await?;

        Self::check(response).await.map(drop)
    }

    /// Delete every row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unfiltered query, on transport failure or a
    /// non-2xx answer.
    pub async fn delete(&self, table: &str, query: &Query) -> Result<(), StoreError> {
        Self::require_filter("delete", table, query)?;
        debug!(table, "delete");

        let response = self
            .request(Method::DELETE, &self.table_url(table))
            .query(&query.to_pairs())
            .send()
            .await?;

        Self::check(response).await.map(drop)
    }

    /// Call a stored procedure and decode its result.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx answer, or a result
    /// that does not decode into `T`.
    pub async fn rpc<A: Serialize + Sync, T: DeserializeOwned>(
        &self,
        function: &str,
        args: &A,
    ) -> Result<T, StoreError> {
        let response = self.call(function, args).await?;

        decode(response).await
    }

    /// Call a stored procedure that returns nothing.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx answer.
    pub async fn rpc_void<A: Serialize + Sync>(
        &self,
        function: &str,
        args: &A,
    ) -> Result<(), StoreError> {
        self.call(function, args).await.map(drop)
    }

    async fn call<A: Serialize + Sync>(
        &self,
        function: &str,
        args: &A,
    ) -> Result<Response, StoreError> {
        debug!(function, "rpc");

        let response = self
            .request(Method::POST, &self.rpc_url(function))
            .json(args)
            .send()
            .await?;

        Self::check(response).await
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.base)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    fn require_filter(
        operation: &'static str,
        table: &str,
        query: &Query,
    ) -> Result<(), StoreError> {
        if query.is_unfiltered() {
            return Err(StoreError::Unfiltered {
                operation,
                table: table.to_string(),
            });
        }

        Ok(())
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        Err(StoreError::from_response(status.as_u16(), &body))
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response.bytes().await?;

    // Procedures returning void answer with an empty body.
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };

    serde_json::from_slice(body).map_err(StoreError::Decode)
}
