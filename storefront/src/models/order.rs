// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use sqlx::{FromRow, Type as SqlxType};
use toolcart::{CustomerInfo, OrderDetails, OrderLine, OrderTotals};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub order_number: String,
  pub user_id: Option<Uuid>,
  pub customer_name: String,
  pub customer_email: String,
  pub customer_phone: String,
  pub shipping_address: String,
  pub city: String,
  pub postal_code: String,
  pub notes: Option<String>,
  pub subtotal: f64,
  pub shipping_cost: f64,
  pub total: f64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
  pub product_id: String,
  pub product_name: String,
  pub unit_price: f64,
  pub quantity: i32,
  pub line_total: f64,
}

impl From<OrderItemRow> for OrderLine {
  fn from(row: OrderItemRow) -> Self {
    OrderLine {
      product_id: row.product_id,
      product_name: row.product_name,
      unit_price: row.unit_price,
      quantity: row.quantity,
      line_total: row.line_total,
    }
  }
}

impl OrderRow {
  pub fn into_details(self, items: Vec<OrderItemRow>) -> OrderDetails {
    OrderDetails {
      order_id: self.id,
      order_number: self.order_number,
      user_id: self.user_id,
      status: self.status.as_str().to_string(),
      customer: CustomerInfo {
        name: self.customer_name,
        email: self.customer_email,
        phone: self.customer_phone,
        address: self.shipping_address,
        city: self.city,
        postal_code: self.postal_code,
        notes: self.notes,
      },
      items: items.into_iter().map(OrderLine::from).collect(),
      totals: OrderTotals {
        subtotal: self.subtotal,
        shipping_cost: self.shipping_cost,
        total: self.total,
      },
      created_at: self.created_at,
    }
  }
}
