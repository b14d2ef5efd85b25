// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use once_cell::sync::Lazy;
use std::sync::Arc;
use toolcart::{CartItem, CartStore, MemoryGateway, MemorySlot, SyncOrchestrator};
use tracing::Level;
use uuid::Uuid;

// --- Helper for Tracing Setup (call once per test run if needed) ---
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

// --- Catalog fixtures ---
pub fn drill(quantity: i32) -> CartItem {
  CartItem::new("drill-18v", "Cordless Drill 18V", 100.0, quantity).with_image("/img/drill.webp")
}

pub fn bits(quantity: i32) -> CartItem {
  CartItem::new("bit-set", "HSS Bit Set", 50.0, quantity).with_sale_price(40.0)
}

pub fn gloves(quantity: i32) -> CartItem {
  CartItem::new("gloves-l", "Work Gloves L", 7.5, quantity)
}

/// Orchestrator over an in-memory slot and the given gateway, already booted anonymous.
pub async fn anonymous_orchestrator(gateway: &MemoryGateway) -> SyncOrchestrator {
  let orchestrator = SyncOrchestrator::new(CartStore::new(MemorySlot::new()), Arc::new(gateway.clone()));
  orchestrator.boot(None).await;
  orchestrator
}

pub fn user() -> Uuid {
  Uuid::new_v4()
}
