// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use once_cell::sync::Lazy;
use storefront::AppState;
use toolcart::{CartItem, CustomerInfo, MemoryGateway, MemoryOrderStore};
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// App state over in-memory stores, plus handles to inspect them.
pub fn memory_state() -> (AppState, MemoryGateway, MemoryOrderStore) {
  let carts = MemoryGateway::new();
  let orders = MemoryOrderStore::new();
  (AppState::new(carts.clone(), orders.clone()), carts, orders)
}

pub fn drill(quantity: i32) -> CartItem {
  CartItem::new("drill-18v", "Cordless Drill 18V", 100.0, quantity)
}

pub fn bits(quantity: i32) -> CartItem {
  CartItem::new("bit-set", "HSS Bit Set", 50.0, quantity).with_sale_price(40.0)
}

pub fn customer() -> CustomerInfo {
  CustomerInfo {
    name: "Ana Kovač".into(),
    email: "ana@example.com".into(),
    phone: "+385 91 555 0101".into(),
    address: "Ilica 1".into(),
    city: "Zagreb".into(),
    postal_code: "10000".into(),
    notes: None,
  }
}
