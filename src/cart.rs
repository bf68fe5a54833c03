//! Cart
//!
//! In-memory cart lines for one shopper. Totals are always derived from the
//! lines, and each product appears at most once.

use std::num::NonZeroU32;

use rust_decimal::Decimal;

use crate::products::{Product, ProductId};

/// A product snapshot with a positive quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Product as it was when the line was loaded or added
    pub product: Product,

    quantity: NonZeroU32,
}

impl CartItem {
    /// Create a cart line.
    pub fn new(product: Product, quantity: NonZeroU32) -> Self {
        Self { product, quantity }
    }

    /// Product id of the line.
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Units on the line.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Price times quantity.
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }
}

/// The state of a single line before a mutation, used to undo it.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSnapshot {
    product_id: ProductId,
    previous: Option<(usize, CartItem)>,
}

impl LineSnapshot {
    /// Product id the snapshot belongs to.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Whether the line existed before the mutation.
    pub fn existed(&self) -> bool {
        self.previous.is_some()
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from loaded lines, folding duplicate products into one
    /// line.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();

        for item in items {
            match cart.position(item.product_id()) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity());
                    }
                }
                None => cart.items.push(item),
            }
        }

        cart
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by product id.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id() == product_id)
    }

    /// Whether the product has a line.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Sum of price times quantity across all lines.
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Quantity the product would have after adding `quantity` more units.
    pub fn quantity_after_add(&self, product_id: &ProductId, quantity: NonZeroU32) -> NonZeroU32 {
        self.get(product_id)
            .map_or(quantity, |item| item.quantity.saturating_add(quantity.get()))
    }

    /// Set the quantity of a product, appending a new line when absent.
    ///
    /// An existing line keeps its product snapshot and position.
    pub fn put(&mut self, product: &Product, quantity: NonZeroU32) -> LineSnapshot {
        let snapshot = self.snapshot(&product.id);

        match self.items.iter_mut().find(|item| item.product.id == product.id) {
            Some(item) => item.quantity = quantity,
            None => self.items.push(CartItem::new(product.clone(), quantity)),
        }

        snapshot
    }

    /// Change the quantity of an existing line. `None` when the product has
    /// no line.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: NonZeroU32,
    ) -> Option<LineSnapshot> {
        let snapshot = self.snapshot(product_id);
        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_id() == product_id)?;

        item.quantity = quantity;

        Some(snapshot)
    }

    /// Remove a product's line, if any.
    pub fn remove(&mut self, product_id: &ProductId) -> LineSnapshot {
        let snapshot = self.snapshot(product_id);

        self.items.retain(|item| item.product_id() != product_id);

        snapshot
    }

    /// Remove every line, returning what was there.
    pub fn clear(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }

    /// Undo a single-line mutation.
    pub fn restore(&mut self, snapshot: LineSnapshot) {
        self.items
            .retain(|item| item.product_id() != &snapshot.product_id);

        if let Some((index, item)) = snapshot.previous {
            let index = index.min(self.items.len());
            self.items.insert(index, item);
        }
    }

    /// Re-add lines taken by [`Cart::clear`] whose products have not been
    /// added again since.
    pub fn restore_missing(&mut self, items: Vec<CartItem>) {
        let mut restored: Vec<CartItem> = items
            .into_iter()
            .filter(|item| !self.contains(item.product_id()))
            .collect();

        restored.append(&mut self.items);
        self.items = restored;
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id() == product_id)
    }

    fn snapshot(&self, product_id: &ProductId) -> LineSnapshot {
        LineSnapshot {
            product_id: product_id.clone(),
            previous: self
                .position(product_id)
                .and_then(|index| self.items.get(index).map(|item| (index, item.clone()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
    }

    fn product(id: &str, price: i64) -> Product {
        Product::new(id, format!("Product {id}"), "Bags", Decimal::from(price))
    }

    #[test]
    fn totals_are_derived_from_lines() {
        let mut cart = Cart::new();

        cart.put(&product("a", 100), qty(2));
        cart.put(&product("b", 35), qty(3));

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), Decimal::from(305));
    }

    #[test]
    fn put_merges_into_existing_line() {
        let mut cart = Cart::new();
        let a = product("a", 10);

        cart.put(&a, qty(2));
        let target = cart.quantity_after_add(&a.id, qty(3));
        cart.put(&a, target);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&a.id).map(CartItem::quantity), Some(5));
    }

    #[test]
    fn restore_undoes_put_on_new_line() {
        let mut cart = Cart::new();
        cart.put(&product("a", 10), qty(1));

        let snapshot = cart.put(&product("b", 10), qty(4));
        assert!(!snapshot.existed());

        cart.restore(snapshot);

        assert_eq!(cart.len(), 1);
        assert!(!cart.contains(&ProductId::new("b")));
    }

    #[test]
    fn restore_puts_removed_line_back_in_place() {
        let mut cart = Cart::new();
        cart.put(&product("a", 10), qty(1));
        cart.put(&product("b", 10), qty(2));
        cart.put(&product("c", 10), qty(3));

        let snapshot = cart.remove(&ProductId::new("b"));
        assert_eq!(cart.len(), 2);

        cart.restore(snapshot);

        let order: Vec<&str> = cart.items().iter().map(|i| i.product_id().as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(cart.total_items(), 6);
    }

    #[test]
    fn set_quantity_on_missing_line_is_none() {
        let mut cart = Cart::new();

        assert!(cart.set_quantity(&ProductId::new("x"), qty(2)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn from_items_folds_duplicates() {
        let a = product("a", 10);

        let cart = Cart::from_items([
            CartItem::new(a.clone(), qty(1)),
            CartItem::new(product("b", 5), qty(1)),
            CartItem::new(a, qty(2)),
        ]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_items(), 4);
    }

    #[test]
    fn restore_missing_skips_lines_added_since_clear() {
        let mut cart = Cart::new();
        cart.put(&product("a", 10), qty(1));
        cart.put(&product("b", 10), qty(1));

        let cleared = cart.clear();
        cart.put(&product("b", 10), qty(7));
        cart.restore_missing(cleared);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&ProductId::new("b")).map(CartItem::quantity), Some(7));
    }
}
