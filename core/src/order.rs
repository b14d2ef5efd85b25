// core/src/order.rs

//! Checkout: customer validation, pricing and order numbers.
//!
//! Unlike cart mirroring, order creation has no local fallback. Every error
//! here is returned to the caller and must halt checkout.

use crate::cart::{compute_total, CartItem};
use crate::error::{GatewayError, OrderError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Shipping is free for every order.
pub const FREE_SHIPPING: f64 = 0.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub address: String,
  #[serde(default)]
  pub city: String,
  #[serde(default)]
  pub postal_code: String,
  #[serde(default)]
  pub notes: Option<String>,
}

impl CustomerInfo {
  pub fn validate(&self) -> Result<(), OrderError> {
    let required = [
      ("name", &self.name),
      ("email", &self.email),
      ("phone", &self.phone),
      ("address", &self.address),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(OrderError::MissingField(field));
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
  pub subtotal: f64,
  pub shipping_cost: f64,
  pub total: f64,
}

pub fn price_order(items: &[CartItem], shipping_cost: f64) -> OrderTotals {
  let subtotal = compute_total(items);
  OrderTotals {
    subtotal,
    shipping_cost,
    total: subtotal + shipping_cost,
  }
}

/// `ORD-YYYYMMDD-HHMMSS-XXXX`, the suffix a zero-padded number below 10000.
pub fn generate_order_number(now: DateTime<Utc>, rng: &mut impl RngCore) -> String {
  let suffix = rng.next_u32() % 10_000;
  format!("ORD-{}-{:04}", now.format("%Y%m%d-%H%M%S"), suffix)
}

pub fn next_order_number() -> String {
  generate_order_number(Utc::now(), &mut OsRng)
}

/// A validated, priced order ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub order_number: String,
  pub user_id: Option<Uuid>,
  pub customer: CustomerInfo,
  pub items: Vec<CartItem>,
  pub totals: OrderTotals,
}

impl NewOrder {
  /// Validates the customer and lines, prices the order and assigns a number.
  pub fn prepare(customer: CustomerInfo, items: Vec<CartItem>, user_id: Option<Uuid>) -> Result<Self, OrderError> {
    customer.validate()?;
    if items.is_empty() {
      return Err(OrderError::EmptyCart);
    }
    if let Some(bad) = items.iter().find(|i| i.quantity < 1) {
      return Err(OrderError::InvalidQuantity {
        product_id: bad.product_id.clone(),
        quantity: bad.quantity,
      });
    }
    let totals = price_order(&items, FREE_SHIPPING);
    Ok(Self {
      order_number: next_order_number(),
      user_id,
      customer,
      items,
      totals,
    })
  }

  /// Order lines with the unit price frozen at the effective (sale or regular) price.
  pub fn lines(&self) -> Vec<OrderLine> {
    self
      .items
      .iter()
      .map(|item| OrderLine {
        product_id: item.product_id.clone(),
        product_name: item.name.clone(),
        unit_price: item.effective_price(),
        quantity: item.quantity,
        line_total: item.line_total(),
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub product_id: String,
  pub product_name: String,
  pub unit_price: f64,
  pub quantity: i32,
  pub line_total: f64,
}

/// A stored order as shown on the confirmation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
  pub order_id: Uuid,
  pub order_number: String,
  pub user_id: Option<Uuid>,
  pub status: String,
  pub customer: CustomerInfo,
  pub items: Vec<OrderLine>,
  pub totals: OrderTotals,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
  pub order_id: Uuid,
  pub order_number: String,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Stores the order and all of its lines atomically.
  async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, GatewayError>;

  async fn find_order(&self, order_number: &str) -> Result<Option<OrderDetails>, GatewayError>;
}

/// In-process order store.
#[derive(Clone, Default)]
pub struct MemoryOrderStore(Arc<Mutex<Vec<OrderDetails>>>);

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn orders(&self) -> Vec<OrderDetails> {
    self.0.lock().clone()
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, GatewayError> {
    let details = OrderDetails {
      order_id: Uuid::new_v4(),
      order_number: order.order_number.clone(),
      user_id: order.user_id,
      status: "pending".to_string(),
      customer: order.customer.clone(),
      items: order.lines(),
      totals: order.totals,
      created_at: Utc::now(),
    };
    let receipt = OrderReceipt {
      order_id: details.order_id,
      order_number: details.order_number.clone(),
    };
    self.0.lock().push(details);
    Ok(receipt)
  }

  async fn find_order(&self, order_number: &str) -> Result<Option<OrderDetails>, GatewayError> {
    Ok(self.0.lock().iter().find(|o| o.order_number == order_number).cloned())
  }
}
