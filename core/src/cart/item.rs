// core/src/cart/item.rs

use serde::{Deserialize, Serialize};

/// A single cart line.
///
/// `name` and `image_url` are a display cache captured when the product was
/// added; the catalog stays the authority for both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub product_id: String,
  pub name: String,
  #[serde(default)]
  pub image_url: Option<String>,
  pub price: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sale_price: Option<f64>,
  pub quantity: i32,
}

impl CartItem {
  pub fn new(product_id: impl Into<String>, name: impl Into<String>, price: f64, quantity: i32) -> Self {
    Self {
      product_id: product_id.into(),
      name: name.into(),
      image_url: None,
      price,
      sale_price: None,
      quantity,
    }
  }

  pub fn with_sale_price(mut self, sale_price: f64) -> Self {
    self.sale_price = Some(sale_price);
    self
  }

  pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
    self.image_url = Some(image_url.into());
    self
  }

  /// Sale price when present, regular price otherwise.
  pub fn effective_price(&self) -> f64 {
    self.sale_price.unwrap_or(self.price)
  }

  pub fn line_total(&self) -> f64 {
    self.effective_price() * f64::from(self.quantity)
  }
}
