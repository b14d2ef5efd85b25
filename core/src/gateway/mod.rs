// core/src/gateway/mod.rs

//! Transport to the authoritative per-user cart.
//!
//! A gateway reads and writes one cart row plus its line rows per user. Three
//! implementations exist: [`MemoryGateway`] in process, [`HttpCartGateway`]
//! over the storefront's REST surface, and the Postgres gateway in the
//! storefront server itself.

mod http;
mod memory;

pub use http::{ClientConfig, HttpCartGateway, OrderRequest};
pub use memory::MemoryGateway;

use crate::cart::CartItem;
use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// A single-line change applied without resending the whole cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CartDelta {
  /// Increments an existing line or inserts a new one.
  Add { item: CartItem },
  /// Sets the quantity; `quantity <= 0` deletes the line.
  #[serde(rename_all = "camelCase")]
  Update { product_id: String, quantity: i32 },
  #[serde(rename_all = "camelCase")]
  Remove { product_id: String },
  Clear,
}

impl CartDelta {
  pub fn action(&self) -> &'static str {
    match self {
      CartDelta::Add { .. } => "add",
      CartDelta::Update { .. } => "update",
      CartDelta::Remove { .. } => "remove",
      CartDelta::Clear => "clear",
    }
  }

  /// Whether the delta needs an existing cart row. `add` creates one lazily.
  pub fn requires_existing_cart(&self) -> bool {
    !matches!(self, CartDelta::Add { .. })
  }
}

/// What a delta did to the remote lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaOutcome {
  Inserted,
  Updated,
  Removed,
  Cleared,
}

#[async_trait]
pub trait CartGateway: Send + Sync {
  /// Lines of the user's remote cart. A user without a cart row has an empty cart.
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartItem>, GatewayError>;

  /// Replaces every remote line with `items`, creating the cart row if needed.
  async fn save_full(&self, user_id: Uuid, items: &[CartItem]) -> Result<(), GatewayError>;

  /// `update`, `remove` and `clear` report [`GatewayError::CartNotFound`] for
  /// a user without a cart row.
  async fn apply_delta(&self, user_id: Uuid, delta: &CartDelta) -> Result<DeltaOutcome, GatewayError>;
}

/// Loads the remote cart, treating every failure as an empty cart.
pub async fn load_from_remote(gateway: &dyn CartGateway, user_id: Uuid) -> Vec<CartItem> {
  match gateway.load(user_id).await {
    Ok(items) => {
      info!(%user_id, items = items.len(), "Loaded remote cart.");
      items
    }
    Err(e) => {
      warn!(%user_id, error = %e, "Remote cart unavailable, treating as empty.");
      Vec::new()
    }
  }
}
