// core/src/persist.rs

//! Durable client-side slots holding the serialized cart.
//!
//! A slot is a single named value in device-local storage. The cart is written
//! in full after every mutation and read back once at boot.

use crate::cart::Cart;
use crate::error::{CartError, CartResult};
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Namespaced key the cart blob lives under.
pub const CART_STORAGE_KEY: &str = "toolcart.cart-storage";

/// A single durable key-value slot.
pub trait CartSlot: Send + Sync {
  fn key(&self) -> &str;

  /// `Ok(None)` when nothing has been stored yet.
  fn load(&self) -> CartResult<Option<String>>;

  fn save(&self, blob: &str) -> CartResult<()>;
}

/// Slot backed by one JSON file inside a data directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
  key: String,
  path: PathBuf,
}

impl FileSlot {
  /// Slot for [`CART_STORAGE_KEY`] under `data_dir`.
  pub fn new(data_dir: impl AsRef<Path>) -> Self {
    Self::with_key(data_dir, CART_STORAGE_KEY)
  }

  pub fn with_key(data_dir: impl AsRef<Path>, key: &str) -> Self {
    Self {
      key: key.to_string(),
      path: data_dir.as_ref().join(format!("{}.json", key)),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl CartSlot for FileSlot {
  fn key(&self) -> &str {
    &self.key
  }

  fn load(&self) -> CartResult<Option<String>> {
    match fs::read_to_string(&self.path) {
      Ok(blob) => Ok(Some(blob)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(source) => Err(CartError::SlotRead {
        key: self.key.clone(),
        source,
      }),
    }
  }

  fn save(&self, blob: &str) -> CartResult<()> {
    let write_err = |source| CartError::SlotWrite {
      key: self.key.clone(),
      source,
    };
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).map_err(write_err)?;
    }
    // Write then rename so a crash mid-write never leaves a truncated blob.
    let tmp = self.path.with_extension("json.tmp");
    fs::write(&tmp, blob).map_err(write_err)?;
    fs::rename(&tmp, &self.path).map_err(write_err)?;
    debug!(key = %self.key, bytes = blob.len(), "Cart slot written.");
    Ok(())
  }
}

/// In-process slot. Survives nothing, useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
  value: Mutex<Option<String>>,
}

impl MemorySlot {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(blob: impl Into<String>) -> Self {
    Self {
      value: Mutex::new(Some(blob.into())),
    }
  }

  pub fn raw(&self) -> Option<String> {
    self.value.lock().clone()
  }
}

impl CartSlot for MemorySlot {
  fn key(&self) -> &str {
    CART_STORAGE_KEY
  }

  fn load(&self) -> CartResult<Option<String>> {
    Ok(self.value.lock().clone())
  }

  fn save(&self, blob: &str) -> CartResult<()> {
    *self.value.lock() = Some(blob.to_string());
    Ok(())
  }
}

pub fn encode_cart(cart: &Cart) -> CartResult<String> {
  Ok(serde_json::to_string(cart)?)
}

pub fn decode_cart(blob: &str) -> CartResult<Cart> {
  Ok(serde_json::from_str(blob)?)
}

/// Reads the cart from `slot`, falling back to an empty cart on any failure.
pub fn load_or_empty(slot: &dyn CartSlot) -> Cart {
  let blob = match slot.load() {
    Ok(Some(blob)) => blob,
    Ok(None) => return Cart::new(),
    Err(e) => {
      warn!(key = slot.key(), error = %e, "Unable to read cart slot, starting with an empty cart.");
      return Cart::new();
    }
  };
  match decode_cart(&blob) {
    Ok(cart) => cart,
    Err(e) => {
      warn!(key = slot.key(), error = %e, "Persisted cart is unreadable, starting with an empty cart.");
      Cart::new()
    }
  }
}
