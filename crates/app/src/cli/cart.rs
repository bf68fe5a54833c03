use std::num::NonZeroU32;

use boutique::products::ProductId;
use boutique_app::{config::AppConfig, context::AppContext};
use clap::{Args, Subcommand};

use super::{open_session, render, require_user};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart with its totals
    Show,

    /// Add units of a product
    Add(AddArgs),

    /// Set the quantity of a line; zero or less removes it
    Set(SetArgs),

    /// Remove a line
    Remove(RemoveArgs),

    /// Remove every line
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    product_id: String,

    /// Units to add
    #[arg(long, default_value_t = NonZeroU32::MIN)]
    quantity: NonZeroU32,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Product id
    product_id: String,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Product id
    product_id: String,
}

pub(crate) async fn run(config: &AppConfig, command: CartCommand) -> Result<(), String> {
    let app = open_session(config).await?;
    require_user(&app)?;

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add(args) => {
            let product = app
                .catalog
                .get_product(&ProductId::new(args.product_id))
                .await
                .map_err(|error| format!("failed to load product: {error}"))?;

            app.cart
                .add_to_cart(&product, args.quantity)
                .await
                .map_err(|error| format!("failed to add to cart: {error}"))?;
        }
        CartSubcommand::Set(args) => app
            .cart
            .update_quantity(&ProductId::new(args.product_id), args.quantity)
            .await
            .map_err(|error| format!("failed to update quantity: {error}"))?,
        CartSubcommand::Remove(args) => app
            .cart
            .remove(&ProductId::new(args.product_id))
            .await
            .map_err(|error| format!("failed to remove item: {error}"))?,
        CartSubcommand::Clear => app
            .cart
            .clear()
            .await
            .map_err(|error| format!("failed to clear cart: {error}"))?,
    }

    print_cart(&app);

    Ok(())
}

fn print_cart(app: &AppContext) {
    let items = app.cart.items();

    if items.is_empty() {
        println!("cart is empty");
        return;
    }

    println!("{}", render::cart_table(&items, app.currency));
    print!("{}", render::summary(&app.cart.summary(), app.currency));
}
