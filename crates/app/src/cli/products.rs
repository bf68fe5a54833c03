use std::path::PathBuf;

use boutique::{
    filters::{
        DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE, FilterSpec, SortBy, audience_view, filter_products,
        sale_view,
    },
    fixtures::CatalogFixture,
    products::{Audience, Product, ProductId},
};
use boutique_app::config::AppConfig;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use super::{open_session, render};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum AudienceArg {
    Men,
    Women,
}

impl From<AudienceArg> for Audience {
    fn from(value: AudienceArg) -> Self {
        match value {
            AudienceArg::Men => Self::Men,
            AudienceArg::Women => Self::Women,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ListProductsArgs {
    /// Only show this category; repeat for several
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Lowest price to show
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price to show
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Sort order (featured, price-low, price-high, newest, discount)
    #[arg(long, default_value_t = SortBy::Featured)]
    sort: SortBy,

    /// Only show products merchandised for this audience
    #[arg(long, value_enum)]
    audience: Option<AudienceArg>,

    /// Only show products flagged on sale
    #[arg(long)]
    on_sale: bool,

    /// Read the catalog from a YAML file instead of the data service
    #[arg(long)]
    fixture: Option<PathBuf>,
}

impl ListProductsArgs {
    fn spec(&self) -> FilterSpec {
        FilterSpec::default()
            .with_categories(self.categories.iter().map(String::as_str))
            .with_price_range(
                self.min_price.unwrap_or(DEFAULT_MIN_PRICE),
                self.max_price.unwrap_or(DEFAULT_MAX_PRICE),
            )
            .with_sort(self.sort)
    }

    fn view(&self, products: &[Product]) -> Vec<Product> {
        let mut products = match self.audience {
            Some(audience) => audience_view(products, audience.into()),
            None => products.to_vec(),
        };

        if self.on_sale {
            products = sale_view(&products);
        }

        filter_products(&products, &self.spec())
    }
}

#[derive(Debug, Args)]
pub(crate) struct ShowProductArgs {
    /// Product id
    id: String,
}

pub(crate) async fn list(config: &AppConfig, args: ListProductsArgs) -> Result<(), String> {
    let currency = config
        .checkout
        .currency()
        .map_err(|error| format!("invalid currency: {error}"))?;

    let catalog = match &args.fixture {
        Some(path) => CatalogFixture::from_path(path)
            .map_err(|error| format!("failed to read catalog fixture: {error}"))?
            .into_products(),
        None => open_session(config)
            .await?
            .catalog
            .list_products()
            .await
            .map_err(|error| format!("failed to list products: {error}"))?,
    };

    let products = args.view(&catalog);

    if products.is_empty() {
        println!("no products match");
        return Ok(());
    }

    println!("{}", render::products_table(&products, currency));

    Ok(())
}

pub(crate) async fn show(config: &AppConfig, args: ShowProductArgs) -> Result<(), String> {
    let app = open_session(config).await?;

    let product = app
        .catalog
        .get_product(&ProductId::new(args.id))
        .await
        .map_err(|error| format!("failed to load product: {error}"))?;

    print!("{}", render::product_details(&product, app.currency));

    Ok(())
}
