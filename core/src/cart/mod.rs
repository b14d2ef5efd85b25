// core/src/cart/mod.rs

//! Pure cart aggregate. Every mutation recomputes the cached total; nothing
//! in here performs I/O.

mod item;

pub use item::CartItem;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The cart aggregate: ordered lines, a derived total and the optional
/// identity the cart is mirrored for.
///
/// Deserialization ignores any stored `total` and recomputes it from the items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCart")]
pub struct Cart {
  items: Vec<CartItem>,
  total: f64,
  user_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCart {
  #[serde(default)]
  items: Vec<CartItem>,
  #[serde(default)]
  user_id: Option<Uuid>,
}

impl From<StoredCart> for Cart {
  fn from(stored: StoredCart) -> Self {
    let mut cart = Cart {
      items: stored.items,
      total: 0.0,
      user_id: stored.user_id,
    };
    cart.recompute();
    cart
  }
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a cart by adding each item in turn, so duplicate products collapse
  /// into one line.
  pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
    let mut cart = Cart::new();
    for item in items {
      cart.add_item(item);
    }
    cart
  }

  pub fn into_items(self) -> Vec<CartItem> {
    self.items
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn total(&self) -> f64 {
    self.total
  }

  pub fn user_id(&self) -> Option<Uuid> {
    self.user_id
  }

  pub fn set_user_id(&mut self, user_id: Option<Uuid>) {
    self.user_id = user_id;
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&self, product_id: &str) -> Option<&CartItem> {
    self.items.iter().find(|i| i.product_id == product_id)
  }

  /// Total number of units across all lines.
  pub fn item_count(&self) -> i64 {
    self.items.iter().map(|i| i64::from(i.quantity)).sum()
  }

  /// Adds `item`, incrementing the existing line for the same product instead
  /// of appending a duplicate.
  pub fn add_item(&mut self, item: CartItem) {
    match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
      Some(existing) => existing.quantity += item.quantity,
      None => self.items.push(item),
    }
    self.recompute();
  }

  pub fn remove_item(&mut self, product_id: &str) {
    self.items.retain(|i| i.product_id != product_id);
    self.recompute();
  }

  /// Quantities below 1 remove the line.
  pub fn update_quantity(&mut self, product_id: &str, quantity: i32) {
    if quantity < 1 {
      self.remove_item(product_id);
      return;
    }
    if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
      existing.quantity = quantity;
    }
    self.recompute();
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.recompute();
  }

  /// Wholesale replacement, used when the remote cart wins a login reconciliation.
  pub fn replace_items(&mut self, items: Vec<CartItem>) {
    self.items = items;
    self.recompute();
  }

  fn recompute(&mut self) {
    self.total = compute_total(&self.items);
  }
}

/// `Σ quantity × (sale_price ?? price)`. Order-independent.
pub fn compute_total(items: &[CartItem]) -> f64 {
  items.iter().map(CartItem::line_total).sum()
}
