use std::num::NonZeroU32;

use boutique::products::ProductId;
use boutique_app::{config::AppConfig, domain::checkout::Address};
use clap::Args;

use super::open_session;

/// Shipping address given on the command line. When every field is
/// omitted the saved profile address is used.
#[derive(Debug, Default, Args)]
pub(crate) struct AddressArgs {
    /// Recipient name
    #[arg(long)]
    ship_name: Option<String>,

    /// Street address
    #[arg(long)]
    ship_line1: Option<String>,

    /// Apartment, suite or unit
    #[arg(long)]
    ship_line2: Option<String>,

    #[arg(long)]
    ship_city: Option<String>,

    /// State or province
    #[arg(long)]
    ship_state: Option<String>,

    #[arg(long)]
    ship_postal_code: Option<String>,

    /// ISO country code
    #[arg(long)]
    ship_country: Option<String>,
}

impl AddressArgs {
    fn into_address(self) -> Option<Address> {
        let given = self.ship_name.is_some()
            || self.ship_line1.is_some()
            || self.ship_city.is_some()
            || self.ship_postal_code.is_some()
            || self.ship_country.is_some();

        given.then(|| Address {
            name: self.ship_name.unwrap_or_default(),
            line1: self.ship_line1.unwrap_or_default(),
            line2: self.ship_line2,
            city: self.ship_city.unwrap_or_default(),
            state: self.ship_state,
            postal_code: self.ship_postal_code.unwrap_or_default(),
            country: self.ship_country.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[command(flatten)]
    address: AddressArgs,
}

#[derive(Debug, Args)]
pub(crate) struct BuyNowArgs {
    /// Product id
    product_id: String,

    /// Units to order
    #[arg(long, default_value_t = NonZeroU32::MIN)]
    quantity: NonZeroU32,

    #[command(flatten)]
    address: AddressArgs,
}

pub(crate) async fn checkout(config: &AppConfig, args: CheckoutArgs) -> Result<(), String> {
    let app = open_session(config).await?;

    let number = app
        .checkout
        .checkout_cart(&app.cart, args.address.into_address())
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    println!("order_number: {number}");

    Ok(())
}

pub(crate) async fn buy_now(config: &AppConfig, args: BuyNowArgs) -> Result<(), String> {
    let app = open_session(config).await?;

    let number = app
        .checkout
        .buy_now(
            app.user(),
            &ProductId::new(args.product_id),
            args.quantity,
            args.address.into_address(),
        )
        .await
        .map_err(|error| format!("order failed: {error}"))?;

    println!("order_number: {number}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_address_flags_means_saved_address() {
        assert_eq!(AddressArgs::default().into_address(), None);
    }

    #[test]
    fn partial_address_is_passed_on_for_validation() {
        let address = AddressArgs {
            ship_city: Some("Lisbon".to_string()),
            ..AddressArgs::default()
        }
        .into_address();

        assert!(
            address.is_some_and(|address| !address.is_complete()),
            "a partial address should reach checkout incomplete"
        );
    }
}
