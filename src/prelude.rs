//! Boutique prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartItem, LineSnapshot},
    filters::{FilterSpec, PriceRange, SortBy, audience_view, filter_products, sale_view},
    fixtures::{CatalogFixture, FixtureError},
    ids::TypedId,
    pricing::{OrderSummary, PricingError, currency, format_price},
    products::{Audience, Product, ProductId, Specifications},
    view::ViewState,
};
