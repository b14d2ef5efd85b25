// storefront/src/db/order_store.rs

use super::storage_err;
use crate::models::{OrderItemRow, OrderRow, OrderStatus};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use toolcart::order::next_order_number;
use toolcart::{GatewayError, NewOrder, OrderDetails, OrderReceipt, OrderStore};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Inserts the order row and its lines in one transaction under `order_number`.
  async fn insert_order(&self, order: &NewOrder, order_number: &str) -> Result<OrderReceipt, sqlx::Error> {
    let order_id = Uuid::new_v4();
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      r#"
      INSERT INTO orders (
        id, order_number, user_id, customer_name, customer_email, customer_phone,
        shipping_address, city, postal_code, notes, subtotal, shipping_cost, total, status
      )
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
      "#,
    )
    .bind(order_id)
    .bind(order_number)
    .bind(order.user_id)
    .bind(&order.customer.name)
    .bind(&order.customer.email)
    .bind(&order.customer.phone)
    .bind(&order.customer.address)
    .bind(&order.customer.city)
    .bind(&order.customer.postal_code)
    .bind(&order.customer.notes)
    .bind(order.totals.subtotal)
    .bind(order.totals.shipping_cost)
    .bind(order.totals.total)
    .bind(OrderStatus::Pending)
    .execute(&mut *tx)
    .await?;

    let lines = order.lines();
    let mut builder: QueryBuilder<Postgres> =
      QueryBuilder::new("INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity, line_total) ");
    builder.push_values(&lines, |mut row, line| {
      row
        .push_bind(order_id)
        .push_bind(&line.product_id)
        .push_bind(&line.product_name)
        .push_bind(line.unit_price)
        .push_bind(line.quantity)
        .push_bind(line.line_total);
    });
    builder.build().execute(&mut *tx).await?;

    tx.commit().await?;
    info!(%order_id, %order_number, total = order.totals.total, "Order stored.");

    Ok(OrderReceipt {
      order_id,
      order_number: order_number.to_string(),
    })
  }
}

fn is_order_number_conflict(err: &sqlx::Error) -> bool {
  err
    .as_database_error()
    .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(ORDER_NUMBER_CONSTRAINT))
}

#[async_trait]
impl OrderStore for PgOrderStore {
  /// A number that collides with an existing order is regenerated once.
  #[instrument(name = "pg_order::create", skip(self, order), fields(order_number = %order.order_number, items = order.items.len()))]
  async fn create_order(&self, order: &NewOrder) -> Result<OrderReceipt, GatewayError> {
    match self.insert_order(order, &order.order_number).await {
      Err(e) if is_order_number_conflict(&e) => {
        let retry_number = next_order_number();
        warn!(taken = %order.order_number, %retry_number, "Order number already taken; retrying.");
        self
          .insert_order(order, &retry_number)
          .await
          .map_err(storage_err("Failed to store order"))
      }
      result => result.map_err(storage_err("Failed to store order")),
    }
  }

  #[instrument(name = "pg_order::find", skip(self))]
  async fn find_order(&self, order_number: &str) -> Result<Option<OrderDetails>, GatewayError> {
    let order: Option<OrderRow> = sqlx::query_as(
      r#"
      SELECT id, order_number, user_id, customer_name, customer_email, customer_phone,
             shipping_address, city, postal_code, notes, subtotal, shipping_cost, total,
             status, created_at
      FROM orders
      WHERE order_number = $1
      "#,
    )
    .bind(order_number)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err("Failed to fetch order"))?;

    let Some(order) = order else {
      return Ok(None);
    };

    let items: Vec<OrderItemRow> = sqlx::query_as(
      "SELECT product_id, product_name, unit_price, quantity, line_total FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order.id)
    .fetch_all(&self.pool)
    .await
    .map_err(storage_err("Failed to fetch order items"))?;

    Ok(Some(order.into_details(items)))
  }
}
