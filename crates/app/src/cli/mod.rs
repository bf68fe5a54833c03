use std::sync::Arc;

use boutique_app::{
    config::AppConfig, context::AppContext, observability, session::CurrentUser,
};
use clap::{Parser, Subcommand};

mod cart;
mod checkout;
mod console;
mod orders;
mod products;
mod render;

#[derive(Debug, Parser)]
#[command(name = "boutique", about = "Boutique storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products
    Products(products::ListProductsArgs),

    /// Show one product
    Product(products::ShowProductArgs),

    /// Inspect and edit the cart
    Cart(cart::CartCommand),

    /// Order everything in the cart
    Checkout(checkout::CheckoutArgs),

    /// Order a single product without touching the cart
    BuyNow(checkout::BuyNowArgs),

    /// Inspect and manage orders
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Products(args) => products::list(&self.config, args).await,
            Commands::Product(args) => products::show(&self.config, args).await,
            Commands::Cart(command) => cart::run(&self.config, command).await,
            Commands::Checkout(args) => checkout::checkout(&self.config, args).await,
            Commands::BuyNow(args) => checkout::buy_now(&self.config, args).await,
            Commands::Orders(command) => orders::run(&self.config, command).await,
        }
    }
}

/// Build the session services and sign in the configured user, if any.
async fn open_session(config: &AppConfig) -> Result<AppContext, String> {
    let app = AppContext::from_config(
        config,
        Arc::new(console::ConsoleNotifier),
        Arc::new(console::ConsoleNavigator),
    )
    .map_err(|error| format!("failed to start session: {error}"))?;

    if let Some(user) = config.store.current_user() {
        app.sign_in(user)
            .await
            .map_err(|error| format!("failed to load cart: {error}"))?;
    }

    Ok(app)
}

fn require_user(app: &AppContext) -> Result<CurrentUser, String> {
    app.user()
        .ok_or_else(|| "not signed in: set STORE_USER_ID and STORE_ACCESS_TOKEN".to_string())
}
