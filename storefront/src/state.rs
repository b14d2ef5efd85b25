// storefront/src/state.rs
use std::sync::Arc;
use toolcart::{CartGateway, OrderStore};

#[derive(Clone)]
pub struct AppState {
  pub carts: Arc<dyn CartGateway>,
  pub orders: Arc<dyn OrderStore>,
}

impl AppState {
  pub fn new(carts: impl CartGateway + 'static, orders: impl OrderStore + 'static) -> Self {
    Self {
      carts: Arc::new(carts),
      orders: Arc::new(orders),
    }
  }
}
