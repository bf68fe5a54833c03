//! Products

use std::collections::BTreeMap;

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<Product>;

/// Free-form product attributes (material, dimensions, care instructions).
pub type Specifications = BTreeMap<String, String>;

/// Who a product is merchandised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Menswear
    Men,

    /// Womenswear
    Women,

    /// Shown in every audience view
    Unisex,

    /// Any classification this client does not know about
    #[serde(other)]
    Other,
}

/// Product
///
/// Field names follow the remote catalog's column names so rows can be
/// deserialized as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Category label, compared case-insensitively by filters
    pub category: String,

    /// Current price
    pub price: Decimal,

    /// Pre-discount price, present only when the product is discounted
    #[serde(default, rename = "originalPrice", alias = "original_price")]
    pub original_price: Option<Decimal>,

    /// Sale flag, maintained independently of `original_price`
    #[serde(
        default,
        rename = "onSale",
        alias = "on_sale",
        deserialize_with = "null_as_default"
    )]
    pub on_sale: bool,

    /// Reference to the primary display asset
    #[serde(default, rename = "image_url", alias = "image")]
    pub image_ref: Option<String>,

    /// Audience classification used by scoped views
    #[serde(default)]
    pub gender: Option<Audience>,

    /// Long-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Secondary display assets
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_images: Vec<String>,

    /// Arbitrary attribute map
    #[serde(default, deserialize_with = "null_as_default")]
    pub specifications: Specifications,

    /// Units in stock, when the catalog tracks it
    #[serde(default)]
    pub stock_quantity: Option<i64>,

    /// Featured flag
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,

    /// When the product was added to the catalog
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Product {
    /// Create a product with the required fields; everything else is empty.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            original_price: None,
            on_sale: false,
            image_ref: None,
            gender: None,
            description: None,
            additional_images: Vec::new(),
            specifications: Specifications::new(),
            stock_quantity: None,
            is_featured: false,
            created_at: None,
        }
    }

    /// Mark the product as discounted from `original_price`.
    #[must_use]
    pub fn with_original_price(mut self, original_price: Decimal) -> Self {
        self.original_price = Some(original_price);
        self.on_sale = true;
        self
    }

    /// Set the audience classification.
    #[must_use]
    pub fn with_gender(mut self, gender: Audience) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Amount saved against the original price.
    ///
    /// `None` when there is no original price or it does not exceed the
    /// current price.
    pub fn discount(&self) -> Option<Decimal> {
        self.original_price
            .filter(|original| *original > self.price)
            .map(|original| original - self.price)
    }

    /// Whether the product carries a real discount.
    pub fn is_discounted(&self) -> bool {
        self.discount().is_some()
    }

    /// Discount as whole percent points of the original price.
    pub fn discount_percent(&self) -> u32 {
        let (Some(discount), Some(original)) = (self.discount(), self.original_price) else {
            return 0;
        };

        (discount / original * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn discount_requires_higher_original_price() {
        let plain = Product::new("1", "Sweater", "Clothing", Decimal::from(485));
        let discounted = plain.clone().with_original_price(Decimal::from(600));
        let inverted = plain.clone().with_original_price(Decimal::from(400));

        assert_eq!(plain.discount(), None);
        assert_eq!(discounted.discount(), Some(Decimal::from(115)));
        assert_eq!(inverted.discount(), None);
    }

    #[test]
    fn discount_percent_rounds_to_whole_points() {
        let earrings = Product::new("5", "Gold Hoop Earrings", "Jewelry", Decimal::from(340))
            .with_original_price(Decimal::from(450));

        assert_eq!(earrings.discount_percent(), 24);
        assert_eq!(
            Product::new("2", "Sweater", "Clothing", Decimal::TEN).discount_percent(),
            0
        );
    }

    #[test]
    fn deserializes_remote_row_with_nulls() -> TestResult {
        let yaml = r"
id: 0b7c
name: Suede Ankle Boots
category: Footwear
price: 695
originalPrice: null
onSale: null
image_url: boots.jpg
gender: women
additional_images: null
specifications:
  material: suede
";

        let product: Product = serde_norway::from_str(yaml)?;

        assert_eq!(product.id.as_str(), "0b7c");
        assert_eq!(product.price, Decimal::from(695));
        assert!(!product.on_sale);
        assert!(product.additional_images.is_empty());
        assert_eq!(product.gender, Some(Audience::Women));
        assert_eq!(
            product.specifications.get("material").map(String::as_str),
            Some("suede")
        );

        Ok(())
    }

    #[test]
    fn unknown_audience_is_tolerated() -> TestResult {
        let product: Product =
            serde_norway::from_str("{id: x, name: Kite, category: Toys, price: 3, gender: kids}")?;

        assert_eq!(product.gender, Some(Audience::Other));

        Ok(())
    }
}
