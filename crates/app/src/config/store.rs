//! Store Connection Config

use std::time::Duration;

use clap::Args;
use uuid::Uuid;

use crate::{
    config::ConfigError,
    session::{CurrentUser, UserUuid},
    store::RestConfig,
};

/// Data service connection and signed-in user.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Data service project URL
    #[arg(long, env = "STORE_URL")]
    pub store_url: Option<String>,

    /// Public API key of the data service
    #[arg(long, env = "STORE_API_KEY", hide_env_values = true)]
    pub store_api_key: Option<String>,

    /// Access token of the signed-in user
    #[arg(long, env = "STORE_ACCESS_TOKEN", hide_env_values = true)]
    pub store_access_token: Option<String>,

    /// Id of the signed-in user; omit to act signed out
    #[arg(long, env = "STORE_USER_ID")]
    pub store_user_id: Option<Uuid>,

    /// Email of the signed-in user
    #[arg(long, env = "STORE_USER_EMAIL")]
    pub store_user_email: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "STORE_REQUEST_TIMEOUT_SECONDS", default_value_t = 10u64)]
    pub store_request_timeout_seconds: u64,
}

impl StoreConfig {
    /// Client settings for the data service.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL or API key is not configured.
    pub fn rest_config(&self) -> Result<RestConfig, ConfigError> {
        let url = self
            .store_url
            .clone()
            .ok_or(ConfigError::Missing("STORE_URL"))?;
        let api_key = self
            .store_api_key
            .clone()
            .ok_or(ConfigError::Missing("STORE_API_KEY"))?;

        Ok(RestConfig {
            url,
            api_key,
            access_token: self.store_access_token.clone(),
            timeout: Duration::from_secs(self.store_request_timeout_seconds),
        })
    }

    /// The configured user, if any.
    pub fn current_user(&self) -> Option<CurrentUser> {
        let user = CurrentUser::new(UserUuid::from_uuid(self.store_user_id?));

        Some(match &self.store_user_email {
            Some(email) => user.with_email(email.clone()),
            None => user,
        })
    }
}
