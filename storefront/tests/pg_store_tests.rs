// tests/pg_store_tests.rs

//! Postgres gateway and order store against a real database.
//!
//! Runs only when `DATABASE_URL` points at a disposable Postgres; otherwise
//! every test returns early. Each test works on fresh user ids, so no cleanup
//! is needed between runs.

mod common;

use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use storefront::db::{self, PgCartGateway, PgOrderStore};
use toolcart::{CartDelta, CartGateway, CartItem, DeltaOutcome, NewOrder, OrderStore};
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
  let Ok(url) = std::env::var("DATABASE_URL") else {
    eprintln!("DATABASE_URL not set; skipping Postgres test.");
    return None;
  };
  common::setup_tracing();
  let pool = PgPoolOptions::new()
    .max_connections(4)
    .connect(&url)
    .await
    .expect("connect to DATABASE_URL");
  db::run_migrations(&pool).await.expect("apply schema");
  Some(pool)
}

fn hammer(quantity: i32) -> CartItem {
  CartItem::new("hammer-claw", "Claw Hammer", 18.5, quantity).with_image("/img/hammer.webp")
}

#[actix_rt::test]
#[serial]
async fn schema_can_be_applied_repeatedly() {
  let Some(pool) = test_pool().await else { return };
  db::run_migrations(&pool).await.unwrap();
  db::run_migrations(&pool).await.unwrap();
}

#[actix_rt::test]
#[serial]
async fn user_without_cart_row_loads_empty() {
  let Some(pool) = test_pool().await else { return };
  let gateway = PgCartGateway::new(pool);
  assert!(gateway.load(Uuid::new_v4()).await.unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn save_full_replaces_every_line() {
  let Some(pool) = test_pool().await else { return };
  let gateway = PgCartGateway::new(pool);
  let user = Uuid::new_v4();

  gateway.save_full(user, &[common::drill(2), common::bits(1)]).await.unwrap();
  assert_eq!(
    gateway.load(user).await.unwrap(),
    vec![common::drill(2), common::bits(1)]
  );

  gateway.save_full(user, &[hammer(3)]).await.unwrap();
  assert_eq!(gateway.load(user).await.unwrap(), vec![hammer(3)]);

  gateway.save_full(user, &[]).await.unwrap();
  assert!(gateway.load(user).await.unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn concurrent_full_saves_never_interleave() {
  let Some(pool) = test_pool().await else { return };
  let gateway = PgCartGateway::new(pool);
  let user = Uuid::new_v4();
  let first = vec![common::drill(1), common::bits(2)];
  let second = vec![hammer(4)];

  let handles: Vec<_> = [first.clone(), second.clone()]
    .into_iter()
    .map(|items| {
      let gateway = gateway.clone();
      actix_rt::spawn(async move { gateway.save_full(user, &items).await })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let stored = gateway.load(user).await.unwrap();
  assert!(stored == first || stored == second, "interleaved lines: {:?}", stored);
}

#[actix_rt::test]
#[serial]
async fn add_delta_inserts_then_increments() {
  let Some(pool) = test_pool().await else { return };
  let gateway = PgCartGateway::new(pool);
  let user = Uuid::new_v4();

  let first = gateway
    .apply_delta(user, &CartDelta::Add { item: hammer(1) })
    .await
    .unwrap();
  let second = gateway
    .apply_delta(user, &CartDelta::Add { item: hammer(2) })
    .await
    .unwrap();

  assert_eq!(first, DeltaOutcome::Inserted);
  assert_eq!(second, DeltaOutcome::Updated);
  assert_eq!(gateway.load(user).await.unwrap(), vec![hammer(3)]);
}

#[actix_rt::test]
#[serial]
async fn line_deltas_without_cart_are_not_found() {
  let Some(pool) = test_pool().await else { return };
  let gateway = PgCartGateway::new(pool);
  let user = Uuid::new_v4();

  let deltas = [
    CartDelta::Update {
      product_id: "hammer-claw".into(),
      quantity: 2,
    },
    CartDelta::Remove {
      product_id: "hammer-claw".into(),
    },
    CartDelta::Clear,
  ];
  for delta in &deltas {
    let err = gateway.apply_delta(user, delta).await.unwrap_err();
    assert!(err.is_not_found(), "{} should be not found, got {}", delta.action(), err);
  }
  // Failed deltas must not create a cart row either.
  assert!(gateway.load(user).await.unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn update_sets_quantity_and_zero_deletes() {
  let Some(pool) = test_pool().await else { return };
  let gateway = PgCartGateway::new(pool);
  let user = Uuid::new_v4();
  gateway.save_full(user, &[common::drill(1), hammer(1)]).await.unwrap();

  let set = CartDelta::Update {
    product_id: "drill-18v".into(),
    quantity: 5,
  };
  assert_eq!(gateway.apply_delta(user, &set).await.unwrap(), DeltaOutcome::Updated);

  let zero = CartDelta::Update {
    product_id: "hammer-claw".into(),
    quantity: 0,
  };
  assert_eq!(gateway.apply_delta(user, &zero).await.unwrap(), DeltaOutcome::Removed);
  assert_eq!(gateway.load(user).await.unwrap(), vec![common::drill(5)]);

  assert_eq!(
    gateway.apply_delta(user, &CartDelta::Clear).await.unwrap(),
    DeltaOutcome::Cleared
  );
  assert!(gateway.load(user).await.unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn order_and_lines_are_stored_together() {
  let Some(pool) = test_pool().await else { return };
  let store = PgOrderStore::new(pool);
  let user = Uuid::new_v4();
  let order = NewOrder::prepare(common::customer(), vec![common::drill(2), common::bits(1)], Some(user)).unwrap();

  let receipt = store.create_order(&order).await.unwrap();
  assert_eq!(receipt.order_number, order.order_number);

  let stored = store.find_order(&receipt.order_number).await.unwrap().unwrap();
  assert_eq!(stored.order_id, receipt.order_id);
  assert_eq!(stored.user_id, Some(user));
  assert_eq!(stored.status, "pending");
  assert_eq!(stored.customer, common::customer());
  assert_eq!(stored.items, order.lines());
  assert_eq!(stored.totals, order.totals);
  assert_eq!(stored.totals.total, 240.0);
}

#[actix_rt::test]
#[serial]
async fn taken_order_number_is_regenerated() {
  let Some(pool) = test_pool().await else { return };
  let store = PgOrderStore::new(pool);
  let first = NewOrder::prepare(common::customer(), vec![hammer(1)], None).unwrap();
  let mut clash = NewOrder::prepare(common::customer(), vec![hammer(2)], None).unwrap();
  clash.order_number = first.order_number.clone();

  let first_receipt = store.create_order(&first).await.unwrap();
  let clash_receipt = store.create_order(&clash).await.unwrap();

  assert_ne!(clash_receipt.order_number, first_receipt.order_number);
  assert!(clash_receipt.order_number.starts_with("ORD-"));
  let stored = store.find_order(&clash_receipt.order_number).await.unwrap().unwrap();
  assert_eq!(stored.items[0].quantity, 2);
}

#[actix_rt::test]
#[serial]
async fn unknown_order_number_finds_nothing() {
  let Some(pool) = test_pool().await else { return };
  let store = PgOrderStore::new(pool);
  assert!(store.find_order("ORD-19990101-000000-0000").await.unwrap().is_none());
}
