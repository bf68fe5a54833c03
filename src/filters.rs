//! Product Filters
//!
//! Turns a catalog listing into the ordered view a product grid renders.
//! Everything here is pure: inputs are borrowed and never reordered in place.

use std::{cmp::Ordering, fmt, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::{Audience, Product};

/// Lower bound of the default price window.
pub const DEFAULT_MIN_PRICE: Decimal = Decimal::ZERO;

/// Upper bound of the default price window.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

/// Closed price interval, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lowest accepted price
    pub min: Decimal,

    /// Highest accepted price
    pub max: Decimal,
}

impl PriceRange {
    /// Create a new price range. Bounds are taken literally.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whether `price` lies within the range.
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PRICE, DEFAULT_MAX_PRICE)
    }
}

/// Sort order for a filtered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    /// Keep catalog order
    #[default]
    Featured,

    /// Cheapest first
    PriceLow,

    /// Most expensive first
    PriceHigh,

    /// Reverse of catalog order.
    ///
    /// The engine has no creation timestamps, so this only approximates a
    /// recency sort for catalogs listed oldest first.
    Newest,

    /// Largest absolute saving first, undiscounted products last
    Discount,
}

impl SortBy {
    /// All sort orders, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceLow,
        Self::PriceHigh,
        Self::Newest,
        Self::Discount,
    ];

    /// Wire name of the sort order.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
            Self::Discount => "discount",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised sort order name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortBy {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownSortOrder(value.to_string()))
    }
}

/// Filter specification for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Accepted categories; empty means any category.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Accepted price window
    #[serde(default)]
    pub price_range: PriceRange,

    /// Result ordering
    #[serde(default)]
    pub sort_by: SortBy,
}

impl FilterSpec {
    /// Restrict to the given categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to a price window.
    #[must_use]
    pub fn with_price_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Toggle a category in or out of the selection.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(index) = self.categories.iter().position(|c| c == category) {
            self.categories.remove(index);
        } else {
            self.categories.push(category.to_string());
        }
    }

    /// Restore the default filters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Apply a filter specification to a product listing.
///
/// The input slice is left untouched; the returned vector holds clones in
/// the requested order. Ties always keep their relative input order.
pub fn filter_products(products: &[Product], spec: &FilterSpec) -> Vec<Product> {
    let categories: FxHashSet<String> = spec
        .categories
        .iter()
        .map(|category| category.to_lowercase())
        .collect();

    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|product| {
            categories.is_empty() || categories.contains(&product.category.to_lowercase())
        })
        .filter(|product| spec.price_range.contains(product.price))
        .cloned()
        .collect();

    match spec.sort_by {
        SortBy::Featured => {}
        SortBy::PriceLow => filtered.sort_by(|a, b| a.price.cmp(&b.price)),
        SortBy::PriceHigh => filtered.sort_by(|a, b| b.price.cmp(&a.price)),
        SortBy::Newest => filtered.reverse(),
        SortBy::Discount => filtered.sort_by(compare_discount),
    }

    filtered
}

fn compare_discount(a: &Product, b: &Product) -> Ordering {
    match (a.discount(), b.discount()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Products merchandised for an audience. Unisex products appear in every
/// audience view.
pub fn audience_view(products: &[Product], audience: Audience) -> Vec<Product> {
    products
        .iter()
        .filter(|product| {
            matches!(product.gender, Some(gender) if gender == audience || gender == Audience::Unisex)
        })
        .cloned()
        .collect()
}

/// Products flagged on sale.
pub fn sale_view(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|product| product.on_sale)
        .cloned()
        .collect()
}
