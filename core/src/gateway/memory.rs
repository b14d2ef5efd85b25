// core/src/gateway/memory.rs

use super::{CartDelta, CartGateway, DeltaOutcome};
use crate::cart::CartItem;
use crate::error::GatewayError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
  carts: RwLock<HashMap<Uuid, Vec<CartItem>>>,
  offline: AtomicBool,
  writes: AtomicUsize,
}

/// In-process remote cart store.
///
/// Cloning shares the underlying state. [`set_offline`](Self::set_offline)
/// makes every call fail with a transport error.
#[derive(Clone, Default)]
pub struct MemoryGateway(Arc<Inner>);

impl MemoryGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_cart(user_id: Uuid, items: Vec<CartItem>) -> Self {
    let gateway = Self::new();
    gateway.0.carts.write().insert(user_id, items);
    gateway
  }

  pub fn set_offline(&self, offline: bool) {
    self.0.offline.store(offline, Ordering::SeqCst);
  }

  /// Current remote lines, `None` if the user has no cart row.
  pub fn cart_of(&self, user_id: Uuid) -> Option<Vec<CartItem>> {
    self.0.carts.read().get(&user_id).cloned()
  }

  /// Number of successful write calls (`save_full` + `apply_delta`).
  pub fn write_count(&self) -> usize {
    self.0.writes.load(Ordering::SeqCst)
  }

  fn ensure_online(&self) -> Result<(), GatewayError> {
    if self.0.offline.load(Ordering::SeqCst) {
      return Err(GatewayError::transport(anyhow::anyhow!("memory gateway is offline")));
    }
    Ok(())
  }
}

#[async_trait]
impl CartGateway for MemoryGateway {
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError> {
    self.ensure_online()?;
    Ok(self.cart_of(user_id).unwrap_or_default())
  }

  async fn save_full(&self, user_id: Uuid, items: &[CartItem]) -> Result<(), GatewayError> {
    self.ensure_online()?;
    self.0.carts.write().insert(user_id, items.to_vec());
    self.0.writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }

  async fn apply_delta(&self, user_id: Uuid, delta: &CartDelta) -> Result<DeltaOutcome, GatewayError> {
    self.ensure_online()?;
    let mut carts = self.0.carts.write();
    let outcome = match delta {
      CartDelta::Add { item } => {
        let lines = carts.entry(user_id).or_default();
        match lines.iter_mut().find(|l| l.product_id == item.product_id) {
          Some(line) => {
            line.quantity += item.quantity;
            DeltaOutcome::Updated
          }
          None => {
            lines.push(item.clone());
            DeltaOutcome::Inserted
          }
        }
      }
      CartDelta::Update { product_id, quantity } => {
        let lines = carts.get_mut(&user_id).ok_or(GatewayError::CartNotFound)?;
        if *quantity <= 0 {
          lines.retain(|l| &l.product_id != product_id);
          DeltaOutcome::Removed
        } else {
          if let Some(line) = lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = *quantity;
          }
          DeltaOutcome::Updated
        }
      }
      CartDelta::Remove { product_id } => {
        let lines = carts.get_mut(&user_id).ok_or(GatewayError::CartNotFound)?;
        lines.retain(|l| &l.product_id != product_id);
        DeltaOutcome::Removed
      }
      CartDelta::Clear => {
        carts.get_mut(&user_id).ok_or(GatewayError::CartNotFound)?.clear();
        DeltaOutcome::Cleared
      }
    };
    self.0.writes.fetch_add(1, Ordering::SeqCst);
    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn unknown_user_loads_empty() {
    let gateway = MemoryGateway::new();
    assert!(gateway.load(Uuid::new_v4()).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn clear_without_cart_is_not_found() {
    let gateway = MemoryGateway::new();
    let err = gateway.apply_delta(Uuid::new_v4(), &CartDelta::Clear).await.unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn add_delta_creates_then_increments() {
    let gateway = MemoryGateway::new();
    let user = Uuid::new_v4();
    let item = CartItem::new("nailgun", "Nail Gun", 199.0, 1);

    let first = gateway.apply_delta(user, &CartDelta::Add { item: item.clone() }).await.unwrap();
    let second = gateway.apply_delta(user, &CartDelta::Add { item }).await.unwrap();

    assert_eq!(first, DeltaOutcome::Inserted);
    assert_eq!(second, DeltaOutcome::Updated);
    assert_eq!(gateway.cart_of(user).unwrap()[0].quantity, 2);
  }

  #[tokio::test]
  async fn offline_fails_every_call() {
    let gateway = MemoryGateway::new();
    gateway.set_offline(true);
    assert!(matches!(
      gateway.load(Uuid::new_v4()).await,
      Err(GatewayError::Transport { .. })
    ));
  }
}
