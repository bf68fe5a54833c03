//! Integration test over the demo catalog fixture.
//!
//! Runs the listing views a storefront builds from one catalog: audience
//! and sale views, category and price filters, every sort order, and the
//! checkout summary for a small cart.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use testresult::TestResult;

use boutique::{
    cart::{Cart, CartItem},
    filters::{FilterSpec, SortBy, audience_view, filter_products, sale_view},
    fixtures::CatalogFixture,
    pricing::{OrderSummary, currency, format_price},
    products::{Audience, Product},
};

fn catalog() -> TestResult<Vec<Product>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/catalog.yaml");

    Ok(CatalogFixture::from_path(path)?.into_products())
}

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|product| product.id.as_str()).collect()
}

#[test]
fn sale_view_sorted_by_saving() -> TestResult {
    let products = catalog()?;

    let on_sale = sale_view(&products);
    let sorted = filter_products(&on_sale, &FilterSpec::default().with_sort(SortBy::Discount));

    // Savings: tote 400, studs 210, boots 200, earrings 110
    assert_eq!(ids(&sorted), ["8", "12", "10", "5"]);

    Ok(())
}

#[test]
fn audience_view_includes_unisex_and_filters_by_category() -> TestResult {
    let products = catalog()?;

    let menswear = audience_view(&products, Audience::Men);
    assert!(
        menswear.iter().any(|product| product.id.as_str() == "8"),
        "unisex products belong to every audience"
    );

    let clothing = filter_products(
        &menswear,
        &FilterSpec::default()
            .with_categories(["clothing"])
            .with_sort(SortBy::PriceLow),
    );
    assert_eq!(ids(&clothing), ["7", "11"]);

    Ok(())
}

#[test]
fn price_window_is_inclusive_and_keeps_catalog_order() -> TestResult {
    let products = catalog()?;

    let spec = FilterSpec::default().with_price_range(Decimal::from(595), Decimal::from(890));
    let window = filter_products(&products, &spec);

    assert_eq!(ids(&window), ["4", "7", "10", "12"]);

    let newest = filter_products(&products, &spec.with_sort(SortBy::Newest));
    assert_eq!(ids(&newest), ["12", "10", "7", "4"]);

    Ok(())
}

#[test]
fn filtering_never_reorders_the_catalog() -> TestResult {
    let products = catalog()?;
    let before = products.clone();

    for sort in SortBy::ALL {
        let listed = filter_products(&products, &FilterSpec::default().with_sort(sort));
        assert_eq!(listed.len(), before.len(), "{sort} dropped products");
    }

    assert_eq!(products, before);

    Ok(())
}

#[test]
fn checkout_summary_for_fixture_cart() -> TestResult {
    let products = catalog()?;
    let handbag = products.first().cloned().ok_or("empty catalog")?;
    let scarf = products
        .iter()
        .find(|product| product.id.as_str() == "6")
        .cloned()
        .ok_or("scarf missing")?;

    let cart = Cart::from_items([
        CartItem::new(handbag, NonZeroU32::MIN),
        CartItem::new(scarf, NonZeroU32::new(2).ok_or("zero")?),
    ]);

    let summary = OrderSummary::for_cart(&cart);

    // 1299 + 2 * 215 = 1729, ships free, tax 138.32 rounds to 138
    assert_eq!(summary.subtotal, Decimal::from(1729));
    assert_eq!(summary.shipping, Decimal::ZERO);
    assert_eq!(summary.tax, Decimal::from(138));
    assert_eq!(
        format_price(summary.total, currency("usd")?),
        "$1,867.00"
    );

    Ok(())
}
