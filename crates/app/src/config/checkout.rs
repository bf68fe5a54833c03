//! Checkout Config

use boutique::pricing::currency;
use clap::Args;
use rusty_money::iso::Currency;

use crate::{config::ConfigError, domain::checkout::AddressPolicy};

/// Pricing and order placement settings.
#[derive(Debug, Args)]
pub struct CheckoutConfig {
    /// ISO 4217 currency used to display prices
    #[arg(long, env = "STORE_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Use a stand-in shipping address when the shopper has none saved
    #[arg(long, env = "ALLOW_PLACEHOLDER_ADDRESS", default_value_t = false)]
    pub allow_placeholder_address: bool,
}

impl CheckoutConfig {
    /// # Errors
    ///
    /// Returns an error for an unknown currency code.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(currency(&self.currency)?)
    }

    pub fn address_policy(&self) -> AddressPolicy {
        AddressPolicy {
            allow_placeholder: self.allow_placeholder_address,
        }
    }
}
