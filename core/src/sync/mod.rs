// core/src/sync/mod.rs

//! Reconciles the local cart with the remote cart on identity changes.
//!
//! The orchestrator is driven by a single signal, the authenticated identity
//! (`Option<Uuid>`). While anonymous, nothing leaves the device. On login the
//! remote cart wins if it has lines, otherwise the local cart is pushed. While
//! authenticated, every local mutation is mirrored through the [`SyncWorker`].
//! On logout the association is dropped and the visible cart stays as is.

mod worker;

pub use worker::{SyncHandle, SyncStats, SyncTask, SyncWorker};

use crate::cart::{Cart, CartItem};
use crate::gateway::{self, CartDelta, CartGateway};
use crate::store::CartStore;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
  Anonymous,
  Authenticated(Uuid),
}

impl AuthState {
  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      AuthState::Anonymous => None,
      AuthState::Authenticated(user_id) => Some(*user_id),
    }
  }
}

/// Which side won a login reconciliation. Exactly one happens per login.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
  /// The remote cart had lines and replaced the local cart.
  RemoteAdopted { items: usize },
  /// The remote cart was empty or unreachable; the local cart was queued as a full save.
  LocalPushed { items: usize },
}

pub struct SyncOrchestrator {
  store: CartStore,
  gateway: Arc<dyn CartGateway>,
  sync: SyncHandle,
  state: Mutex<AuthState>,
  /// Held across a whole identity transition, remote load included.
  transition: tokio::sync::Mutex<()>,
}

impl SyncOrchestrator {
  /// Spawns the sync worker on the current tokio runtime.
  pub fn new(store: CartStore, gateway: Arc<dyn CartGateway>) -> Self {
    let sync = SyncWorker::spawn(gateway.clone());
    Self {
      store,
      gateway,
      sync,
      state: Mutex::new(AuthState::Anonymous),
      transition: tokio::sync::Mutex::new(()),
    }
  }

  pub fn store(&self) -> &CartStore {
    &self.store
  }

  pub fn sync_handle(&self) -> &SyncHandle {
    &self.sync
  }

  pub fn auth_state(&self) -> AuthState {
    *self.state.lock()
  }

  pub fn cart(&self) -> Cart {
    self.store.snapshot()
  }

  /// Hydrates the local store and applies the identity known at startup.
  ///
  /// A persisted association without a current identity is dropped.
  pub async fn boot(&self, identity: Option<Uuid>) -> Option<LoginOutcome> {
    self.store.hydrate();
    if identity.is_none() && self.store.user_id().is_some() {
      self.store.set_user_id(None);
    }
    self.on_auth_change(identity).await
  }

  /// Feeds the current authenticated identity into the state machine.
  ///
  /// Repeating the current state is a no-op. Switching directly from one
  /// identity to another is a logout followed by a login. Transitions never
  /// interleave: a signal arriving mid-login waits for it to finish.
  pub async fn on_auth_change(&self, identity: Option<Uuid>) -> Option<LoginOutcome> {
    // Overlapping signals queue here; a repeat then sees the settled state.
    let _transition = self.transition.lock().await;
    let current = self.auth_state();
    match (current, identity) {
      (AuthState::Anonymous, None) => None,
      (AuthState::Authenticated(current), Some(next)) if current == next => None,
      (AuthState::Authenticated(_), None) => {
        self.logout();
        None
      }
      (AuthState::Authenticated(_), Some(next)) => {
        self.logout();
        Some(self.login(next).await)
      }
      (AuthState::Anonymous, Some(next)) => Some(self.login(next).await),
    }
  }

  #[instrument(name = "sync::login", skip(self))]
  async fn login(&self, user_id: Uuid) -> LoginOutcome {
    let remote = gateway::load_from_remote(self.gateway.as_ref(), user_id).await;

    let outcome = if !remote.is_empty() {
      let items = remote.len();
      self.store.replace_items(remote);
      info!(%user_id, items, "Remote cart adopted on login.");
      LoginOutcome::RemoteAdopted { items }
    } else {
      let local = self.store.items();
      let items = local.len();
      self.sync.enqueue(SyncTask::SaveFull { user_id, items: local });
      info!(%user_id, items, "Remote cart empty or unavailable; pushing local cart.");
      LoginOutcome::LocalPushed { items }
    };

    self.store.set_user_id(Some(user_id));
    *self.state.lock() = AuthState::Authenticated(user_id);
    outcome
  }

  fn logout(&self) {
    let previous = std::mem::replace(&mut *self.state.lock(), AuthState::Anonymous);
    self.store.set_user_id(None);
    info!(user_id = ?previous.user_id(), "Logged out; local cart kept.");
  }

  pub fn add_item(&self, item: CartItem) {
    self.store.add_item(item.clone());
    self.mirror(|| CartDelta::Add { item });
  }

  pub fn remove_item(&self, product_id: &str) {
    self.store.remove_item(product_id);
    self.mirror(|| CartDelta::Remove {
      product_id: product_id.to_string(),
    });
  }

  pub fn update_quantity(&self, product_id: &str, quantity: i32) {
    self.store.update_quantity(product_id, quantity);
    self.mirror(|| CartDelta::Update {
      product_id: product_id.to_string(),
      quantity,
    });
  }

  pub fn clear(&self) {
    self.store.clear();
    self.mirror(|| CartDelta::Clear);
  }

  /// Queues a full save of the current cart, if authenticated.
  pub fn push_full(&self) {
    if let AuthState::Authenticated(user_id) = self.auth_state() {
      self.sync.enqueue(SyncTask::SaveFull {
        user_id,
        items: self.store.items(),
      });
    }
  }

  fn mirror(&self, delta: impl FnOnce() -> CartDelta) {
    if let AuthState::Authenticated(user_id) = self.auth_state() {
      self.sync.enqueue(SyncTask::Delta {
        user_id,
        delta: delta(),
      });
    }
  }

  pub async fn flush(&self) {
    self.sync.flush().await;
  }

  pub async fn shutdown(&self) {
    self.sync.shutdown().await;
  }
}
