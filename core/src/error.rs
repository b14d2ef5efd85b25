// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors raised by the local persistence layer.
///
/// None of these are fatal to the cart: the store logs them and keeps the
/// in-memory cart as the source of truth.
#[derive(Debug, Error)]
pub enum CartError {
  #[error("Failed to read cart slot '{key}': {source}")]
  SlotRead {
    key: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to write cart slot '{key}': {source}")]
  SlotWrite {
    key: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Persisted cart is not valid JSON: {0}")]
  Corrupt(#[from] serde_json::Error),
}

/// Errors surfaced by a [`CartGateway`](crate::gateway::CartGateway) or an
/// [`OrderStore`](crate::order::OrderStore).
#[derive(Debug, Error)]
pub enum GatewayError {
  /// The user has no remote cart. Expected for update/remove/clear on a fresh user.
  #[error("Cart not found")]
  CartNotFound,

  /// The remote side refused the request as malformed.
  #[error("Request rejected: {0}")]
  Rejected(String),

  #[error("Transport failure: {source}")]
  Transport {
    #[source]
    source: AnyhowError,
  },

  #[error("Storage failure: {source}")]
  Storage {
    #[source]
    source: AnyhowError,
  },
}

impl GatewayError {
  pub fn transport(err: impl Into<AnyhowError>) -> Self {
    GatewayError::Transport { source: err.into() }
  }

  pub fn storage(err: impl Into<AnyhowError>) -> Self {
    GatewayError::Storage { source: err.into() }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, GatewayError::CartNotFound)
  }
}

/// Validation failures for checkout input. Raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
  #[error("Missing required customer field: {0}")]
  MissingField(&'static str),

  #[error("Cannot place an order for an empty cart")]
  EmptyCart,

  #[error("Invalid quantity {quantity} for product '{product_id}'")]
  InvalidQuantity { product_id: String, quantity: i32 },
}

pub type CartResult<T, E = CartError> = std::result::Result<T, E>;
