use std::{fmt::Write, ops::Range};

use boutique::{
    cart::CartItem,
    pricing::{OrderSummary, format_price},
    products::Product,
};
use boutique_app::domain::orders::models::Order;
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

pub(crate) fn products_table(products: &[Product], currency: &'static Currency) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Category", "Price", "Was"]);

    for product in products {
        let was = product
            .original_price
            .filter(|_| product.is_discounted())
            .map(|price| format_price(price, currency))
            .unwrap_or_default();

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            format_price(product.price, currency),
            was,
        ]);
    }

    finish(builder, 3..5)
}

pub(crate) fn product_details(product: &Product, currency: &'static Currency) -> String {
    let mut out = String::new();

    _ = writeln!(out, "{} ({})", product.name, product.id);
    _ = writeln!(out, "category: {}", product.category);
    _ = write!(out, "price: {}", format_price(product.price, currency));

    if product.is_discounted() {
        _ = write!(out, " ({}% off)", product.discount_percent());
    }
    out.push('\n');

    if let Some(stock) = product.stock_quantity {
        _ = writeln!(out, "in stock: {stock}");
    }
    if let Some(description) = &product.description {
        _ = writeln!(out, "\n{description}");
    }

    if !product.specifications.is_empty() {
        let mut builder = Builder::default();
        for (name, value) in &product.specifications {
            builder.push_record([name.as_str(), value.as_str()]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());
        _ = writeln!(out, "\n{table}");
    }

    out
}

pub(crate) fn cart_table(items: &[CartItem], currency: &'static Currency) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Product", "Qty", "Price", "Line total"]);

    for item in items {
        builder.push_record([
            item.product_id().to_string(),
            item.product.name.clone(),
            item.quantity().to_string(),
            format_price(item.product.price, currency),
            format_price(item.line_total(), currency),
        ]);
    }

    finish(builder, 2..5)
}

pub(crate) fn summary(summary: &OrderSummary, currency: &'static Currency) -> String {
    let shipping = if summary.shipping.is_zero() {
        "free".to_string()
    } else {
        format_price(summary.shipping, currency)
    };

    format!(
        "subtotal: {}\nshipping: {shipping}\ntax: {}\ntotal: {}\n",
        format_price(summary.subtotal, currency),
        format_price(summary.tax, currency),
        format_price(summary.total, currency),
    )
}

pub(crate) fn orders_table(orders: &[Order], currency: &'static Currency) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Order", "Placed", "Status", "Items", "Total", "Tracking", "ID"]);

    for order in orders {
        builder.push_record([
            format!("#{}", order.order_number),
            order.created_at.strftime("%Y-%m-%d %H:%M").to_string(),
            order.status.to_string(),
            order.item_count().to_string(),
            format_price(order.total_amount, currency),
            order.tracking_number.clone().unwrap_or_default(),
            order.id.to_string(),
        ]);
    }

    finish(builder, 3..5)
}

fn finish(builder: Builder, right_aligned: Range<usize>) -> String {
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(right_aligned), Alignment::right());

    table.to_string()
}
