//! Application configuration

use boutique::pricing::PricingError;
use clap::Args;
use thiserror::Error;

use crate::config::{checkout::CheckoutConfig, logging::LoggingConfig, store::StoreConfig};

pub mod checkout;
pub mod logging;
pub mod store;

pub use logging::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error(transparent)]
    Currency(#[from] PricingError),
}

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Data service settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Checkout settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
