// storefront/src/models/cart.rs

use sqlx::FromRow;
use toolcart::CartItem;

/// A `cart_items` row. The display fields are snapshots taken at write time.
#[derive(Debug, Clone, FromRow)]
pub struct CartItemRow {
  pub product_id: String,
  pub name: String,
  pub price: f64,
  pub sale_price: Option<f64>,
  pub quantity: i32,
  pub image_url: Option<String>,
}

impl From<CartItemRow> for CartItem {
  fn from(row: CartItemRow) -> Self {
    CartItem {
      product_id: row.product_id,
      name: row.name,
      image_url: row.image_url,
      price: row.price,
      sale_price: row.sale_price,
      quantity: row.quantity,
    }
  }
}
