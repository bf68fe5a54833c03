//! Order Models

use std::fmt::{Display, Formatter, Result as FmtResult};

use boutique::products::ProductId;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

/// Fulfilment state of an order. Unknown states are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl OrderStatus {
    /// Whether the shopper may still cancel. The store has the final say.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Other(status) => status,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

/// Product summary embedded in an order line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderProduct {
    pub id: ProductId,
    pub name: String,

    #[serde(default)]
    pub image_url: Option<String>,
}

/// Order line, priced as it was at purchase.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemUuid,
    pub quantity: u32,
    pub price_at_purchase: Decimal,

    /// `None` when the product has since been removed from the catalog
    #[serde(default, rename = "products")]
    pub product: Option<OrderProduct>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price_at_purchase * Decimal::from(self.quantity)
    }

    /// Product name, or a stand-in for removed products.
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .map_or("Product unavailable", |product| product.name.as_str())
    }
}

/// Order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: OrderUuid,
    pub created_at: Timestamp,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,

    #[serde(default)]
    pub payment_status: Option<String>,

    #[serde(default)]
    pub tracking_number: Option<String>,

    #[serde(default, rename = "order_items")]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn is_cancellable(&self) -> bool {
        self.status.is_cancellable()
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Fields changed by an order status update. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<String>,
    pub tracking_number: Option<String>,
}

impl StatusPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none() && self.tracking_number.is_none()
    }
}
