// src/lib.rs

//! toolcart: a client-local shopping cart reconciled with a per-user server cart.
//!
//! The cart lives on the device first:
//!  - [`Cart`] holds the lines and a derived total, with pure mutation rules.
//!  - [`CartStore`] is the observable state container, persisted to a
//!    [`CartSlot`] after every mutation and hydrated at boot.
//!  - [`CartGateway`] reads and writes the authoritative remote cart.
//!  - [`SyncOrchestrator`] decides who wins on login and mirrors mutations
//!    through a background [`SyncWorker`] while a user is signed in.
//!
//! Remote writes are best effort. The local cart is never reverted because a
//! remote write failed; only order placement surfaces remote failures.

pub mod cart;
pub mod error;
pub mod gateway;
pub mod order;
pub mod persist;
pub mod store;
pub mod sync;

// --- Re-exports for the Public API ---

pub use crate::cart::{compute_total, Cart, CartItem};
pub use crate::error::{CartError, CartResult, GatewayError, OrderError};
pub use crate::gateway::{
  load_from_remote, CartDelta, CartGateway, ClientConfig, DeltaOutcome, HttpCartGateway, MemoryGateway, OrderRequest,
};
pub use crate::order::{
  price_order, CustomerInfo, MemoryOrderStore, NewOrder, OrderDetails, OrderLine, OrderReceipt, OrderStore, OrderTotals,
  FREE_SHIPPING,
};
pub use crate::persist::{CartSlot, FileSlot, MemorySlot, CART_STORAGE_KEY};
pub use crate::store::{CartStore, SubscriptionId};
pub use crate::sync::{AuthState, LoginOutcome, SyncHandle, SyncOrchestrator, SyncTask, SyncWorker};
