//! Cart Records

use std::num::NonZeroU32;

use boutique::{cart::CartItem, products::Product, products::ProductId};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::session::UserUuid;

/// A `cart_items` row joined with its product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartRecord {
    pub product_id: ProductId,
    pub quantity: i64,

    /// Embedded product; `None` when the product has since been deleted
    #[serde(default, rename = "products")]
    pub product: Option<Product>,
}

impl CartRecord {
    pub fn new(product: Product, quantity: i64) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            product: Some(product),
        }
    }

    /// Convert into a cart line. `None` for a missing product or a
    /// non-positive quantity.
    pub fn into_item(self) -> Option<CartItem> {
        let quantity = u32::try_from(self.quantity).ok().and_then(NonZeroU32::new)?;

        self.product.map(|product| CartItem::new(product, quantity))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CartItemUpsert<'a> {
    pub user_id: UserUuid,
    pub product_id: &'a ProductId,
    pub quantity: u32,
    pub updated_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuantityChange {
    pub quantity: u32,
    pub updated_at: Timestamp,
}
