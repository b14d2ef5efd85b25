// storefront/src/db/cart_gateway.rs

use super::storage_err;
use crate::models::CartItemRow;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use toolcart::{CartDelta, CartGateway, CartItem, DeltaOutcome, GatewayError};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Authoritative carts in Postgres: one `carts` row per user, lines in `cart_items`.
#[derive(Clone)]
pub struct PgCartGateway {
  pool: PgPool,
}

impl PgCartGateway {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

async fn find_cart_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
  sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1")
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

async fn find_or_create_cart(conn: &mut PgConnection, user_id: Uuid) -> Result<Uuid, sqlx::Error> {
  sqlx::query_scalar(
    r#"
    INSERT INTO carts (id, user_id)
    VALUES ($1, $2)
    ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
    RETURNING id
    "#,
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .fetch_one(conn)
  .await
}

async fn insert_lines(conn: &mut PgConnection, cart_id: Uuid, items: &[CartItem]) -> Result<(), sqlx::Error> {
  if items.is_empty() {
    return Ok(());
  }
  let mut builder: QueryBuilder<Postgres> =
    QueryBuilder::new("INSERT INTO cart_items (cart_id, product_id, name, price, sale_price, quantity, image_url) ");
  builder.push_values(items, |mut row, item| {
    row
      .push_bind(cart_id)
      .push_bind(&item.product_id)
      .push_bind(&item.name)
      .push_bind(item.price)
      .push_bind(item.sale_price)
      .push_bind(item.quantity)
      .push_bind(&item.image_url);
  });
  builder.build().execute(conn).await?;
  Ok(())
}

#[async_trait]
impl CartGateway for PgCartGateway {
  #[instrument(name = "pg_cart::load", skip(self))]
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError> {
    let mut conn = self.pool.acquire().await.map_err(storage_err("Failed to acquire connection"))?;
    let Some(cart_id) = find_cart_id(&mut conn, user_id)
      .await
      .map_err(storage_err("Failed to look up cart"))?
    else {
      debug!(%user_id, "No cart row for user; returning empty cart.");
      return Ok(Vec::new());
    };

    let rows: Vec<CartItemRow> = sqlx::query_as(
      "SELECT product_id, name, price, sale_price, quantity, image_url FROM cart_items WHERE cart_id = $1 ORDER BY id",
    )
    .bind(cart_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(storage_err("Failed to fetch cart items"))?;

    Ok(rows.into_iter().map(CartItem::from).collect())
  }

  /// Replace-all inside one transaction, so two concurrent full saves for the
  /// same user serialize on the cart row instead of interleaving.
  #[instrument(name = "pg_cart::save_full", skip(self, items), fields(items = items.len()))]
  async fn save_full(&self, user_id: Uuid, items: &[CartItem]) -> Result<(), GatewayError> {
    let mut tx = self.pool.begin().await.map_err(storage_err("Failed to begin transaction"))?;

    let cart_id = find_or_create_cart(&mut tx, user_id)
      .await
      .map_err(storage_err("Failed to find or create cart"))?;
    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&mut *tx)
      .await
      .map_err(storage_err("Failed to delete existing cart items"))?;
    insert_lines(&mut tx, cart_id, items)
      .await
      .map_err(storage_err("Failed to insert cart items"))?;

    tx.commit().await.map_err(storage_err("Failed to commit cart sync"))?;
    info!(%user_id, %cart_id, "Cart fully synced.");
    Ok(())
  }

  #[instrument(name = "pg_cart::apply_delta", skip(self, delta), fields(action = delta.action()))]
  async fn apply_delta(&self, user_id: Uuid, delta: &CartDelta) -> Result<DeltaOutcome, GatewayError> {
    let mut tx = self.pool.begin().await.map_err(storage_err("Failed to begin transaction"))?;

    let cart_id = if delta.requires_existing_cart() {
      find_cart_id(&mut tx, user_id)
        .await
        .map_err(storage_err("Failed to look up cart"))?
        .ok_or(GatewayError::CartNotFound)?
    } else {
      find_or_create_cart(&mut tx, user_id)
        .await
        .map_err(storage_err("Failed to find or create cart"))?
    };

    let outcome = match delta {
      CartDelta::Add { item } => {
        // xmax = 0 only for a freshly inserted tuple.
        let inserted: bool = sqlx::query_scalar(
          r#"
          INSERT INTO cart_items (cart_id, product_id, name, price, sale_price, quantity, image_url)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          ON CONFLICT (cart_id, product_id) DO UPDATE
          SET quantity = cart_items.quantity + EXCLUDED.quantity
          RETURNING (xmax = 0)
          "#,
        )
        .bind(cart_id)
        .bind(&item.product_id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.sale_price)
        .bind(item.quantity)
        .bind(&item.image_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_err("Failed to add cart item"))?;
        if inserted {
          DeltaOutcome::Inserted
        } else {
          DeltaOutcome::Updated
        }
      }
      CartDelta::Update { product_id, quantity } if *quantity <= 0 => {
        delete_line(&mut tx, cart_id, product_id).await?;
        DeltaOutcome::Removed
      }
      CartDelta::Update { product_id, quantity } => {
        sqlx::query("UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2")
          .bind(cart_id)
          .bind(product_id)
          .bind(*quantity)
          .execute(&mut *tx)
          .await
          .map_err(storage_err("Failed to update cart item"))?;
        DeltaOutcome::Updated
      }
      CartDelta::Remove { product_id } => {
        delete_line(&mut tx, cart_id, product_id).await?;
        DeltaOutcome::Removed
      }
      CartDelta::Clear => {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
          .bind(cart_id)
          .execute(&mut *tx)
          .await
          .map_err(storage_err("Failed to clear cart"))?;
        DeltaOutcome::Cleared
      }
    };

    sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
      .bind(cart_id)
      .execute(&mut *tx)
      .await
      .map_err(storage_err("Failed to touch cart"))?;
    tx.commit().await.map_err(storage_err("Failed to commit cart delta"))?;

    info!(%user_id, %cart_id, ?outcome, "Cart delta applied.");
    Ok(outcome)
  }
}

async fn delete_line(conn: &mut PgConnection, cart_id: Uuid, product_id: &str) -> Result<(), GatewayError> {
  sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
    .bind(cart_id)
    .bind(product_id)
    .execute(conn)
    .await
    .map_err(storage_err("Failed to delete cart item"))?;
  Ok(())
}
