//! Boutique
//!
//! Storefront domain core: the product catalog model, the listing filter and
//! sort pipeline, cart lines with derived totals, and checkout pricing.

pub mod cart;
pub mod filters;
pub mod fixtures;
pub mod ids;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod view;
