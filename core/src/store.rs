// core/src/store.rs

//! The observable cart store: one shared state container, explicit listeners.

use crate::cart::{Cart, CartItem};
use crate::persist::{self, CartSlot};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Arc<dyn Fn(&Cart) + Send + Sync>;

struct Inner {
  cart: RwLock<Cart>,
  listeners: RwLock<BTreeMap<SubscriptionId, Listener>>,
  next_listener: AtomicU64,
  hydrated: AtomicBool,
  slot: Box<dyn CartSlot>,
}

/// Shared, cloneable cart state.
///
/// Every mutation persists the whole aggregate to the slot and then notifies
/// listeners with a snapshot. Locks are never held while listeners run, so a
/// listener may read the store again.
///
/// Lock guards are blocking and must not be held across `.await` points;
/// none of the public methods hand one out.
#[derive(Clone)]
pub struct CartStore(Arc<Inner>);

impl CartStore {
  pub fn new(slot: impl CartSlot + 'static) -> Self {
    CartStore(Arc::new(Inner {
      cart: RwLock::new(Cart::new()),
      listeners: RwLock::new(BTreeMap::new()),
      next_listener: AtomicU64::new(0),
      hydrated: AtomicBool::new(false),
      slot: Box::new(slot),
    }))
  }

  /// Loads the persisted cart. Unreadable data yields an empty cart.
  pub fn hydrate(&self) {
    {
      let mut guard = self.0.cart.write();
      self.load_into(&mut guard);
    }
    self.notify();
  }

  /// Whether [`hydrate`](Self::hydrate) has completed. Cart contents are not
  /// meaningful before this returns `true`.
  pub fn is_hydrated(&self) -> bool {
    self.0.hydrated.load(Ordering::Acquire)
  }

  pub fn snapshot(&self) -> Cart {
    self.0.cart.read().clone()
  }

  pub fn items(&self) -> Vec<CartItem> {
    self.0.cart.read().items().to_vec()
  }

  pub fn total(&self) -> f64 {
    self.0.cart.read().total()
  }

  pub fn user_id(&self) -> Option<Uuid> {
    self.0.cart.read().user_id()
  }

  pub fn subscribe(&self, listener: impl Fn(&Cart) + Send + Sync + 'static) -> SubscriptionId {
    let id = SubscriptionId(self.0.next_listener.fetch_add(1, Ordering::Relaxed));
    self.0.listeners.write().insert(id, Arc::new(listener));
    id
  }

  pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
    self.0.listeners.write().remove(&id).is_some()
  }

  pub fn add_item(&self, item: CartItem) {
    self.mutate(|cart| cart.add_item(item));
  }

  pub fn remove_item(&self, product_id: &str) {
    self.mutate(|cart| cart.remove_item(product_id));
  }

  pub fn update_quantity(&self, product_id: &str, quantity: i32) {
    self.mutate(|cart| cart.update_quantity(product_id, quantity));
  }

  pub fn clear(&self) {
    self.mutate(Cart::clear);
  }

  pub fn replace_items(&self, items: Vec<CartItem>) {
    self.mutate(|cart| cart.replace_items(items));
  }

  pub fn set_user_id(&self, user_id: Option<Uuid>) {
    self.mutate(|cart| cart.set_user_id(user_id));
  }

  /// Applies `f` and persists under the write lock, then notifies.
  ///
  /// A mutation issued before [`hydrate`](Self::hydrate) loads the persisted
  /// cart first, so it never overwrites the previous session's blob.
  pub fn mutate<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
    let (result, snapshot) = {
      let mut guard = self.0.cart.write();
      if !self.is_hydrated() {
        debug!("Mutation before hydrate; loading persisted cart first.");
        self.load_into(&mut guard);
      }
      let result = f(&mut guard);
      // Saves run in lock order, so the slot always holds the latest cart.
      self.persist(&guard);
      (result, guard.clone())
    };
    self.notify_with(&snapshot);
    result
  }

  fn load_into(&self, cart: &mut Cart) {
    *cart = persist::load_or_empty(self.0.slot.as_ref());
    info!(
      items = cart.items().len(),
      user_id = ?cart.user_id(),
      "Cart store hydrated."
    );
    self.0.hydrated.store(true, Ordering::Release);
  }

  fn persist(&self, cart: &Cart) {
    let outcome = persist::encode_cart(cart).and_then(|blob| self.0.slot.save(&blob));
    match outcome {
      Ok(()) => debug!(items = cart.items().len(), total = cart.total(), "Cart persisted."),
      Err(e) => warn!(key = self.0.slot.key(), error = %e, "Failed to persist cart; keeping in-memory state."),
    }
  }

  fn notify(&self) {
    let snapshot = self.snapshot();
    self.notify_with(&snapshot);
  }

  fn notify_with(&self, cart: &Cart) {
    let listeners: Vec<Listener> = self.0.listeners.read().values().cloned().collect();
    for listener in listeners {
      listener(cart);
    }
  }
}

impl std::fmt::Debug for CartStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CartStore")
      .field("cart", &*self.0.cart.read())
      .field("hydrated", &self.is_hydrated())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CartResult;
  use crate::persist::{decode_cart, MemorySlot};
  use parking_lot::Mutex;
  use std::sync::atomic::AtomicUsize;
  use std::thread;
  use std::time::Duration;

  /// Shared slot whose first save stalls, widening any gap between mutation and save.
  #[derive(Clone, Default)]
  struct StallingSlot {
    value: Arc<Mutex<Option<String>>>,
    saves: Arc<AtomicUsize>,
  }

  impl CartSlot for StallingSlot {
    fn key(&self) -> &str {
      "stalling"
    }

    fn load(&self) -> CartResult<Option<String>> {
      Ok(self.value.lock().clone())
    }

    fn save(&self, blob: &str) -> CartResult<()> {
      if self.saves.fetch_add(1, Ordering::SeqCst) == 0 {
        thread::sleep(Duration::from_millis(200));
      }
      *self.value.lock() = Some(blob.to_string());
      Ok(())
    }
  }

  fn product_ids(cart: &Cart) -> Vec<String> {
    cart.items().iter().map(|i| i.product_id.clone()).collect()
  }

  #[test]
  fn concurrent_mutations_persist_in_order() {
    let slot = StallingSlot::default();
    let store = CartStore::new(slot.clone());
    store.hydrate();

    let racer = store.clone();
    let first = thread::spawn(move || racer.add_item(CartItem::new("A", "Chisel", 10.0, 1)));
    thread::sleep(Duration::from_millis(50));
    store.add_item(CartItem::new("B", "Mallet", 25.0, 1));
    first.join().unwrap();

    let persisted = decode_cart(&slot.value.lock().clone().unwrap()).unwrap();
    assert_eq!(persisted, store.snapshot());
    assert_eq!(product_ids(&persisted).len(), 2);
  }

  #[test]
  fn mutation_before_hydrate_keeps_previous_session() {
    let mut previous = Cart::new();
    previous.add_item(CartItem::new("A", "Clamp", 12.0, 2));
    let slot = MemorySlot::with_value(persist::encode_cart(&previous).unwrap());

    let store = CartStore::new(slot);
    store.add_item(CartItem::new("B", "Square", 8.0, 1));
    assert!(store.is_hydrated());
    store.hydrate();

    assert_eq!(product_ids(&store.snapshot()), vec!["A", "B"]);
    assert_eq!(store.snapshot().get("A").map(|i| i.quantity), Some(2));
    assert_eq!(store.total(), 32.0);
  }

  #[test]
  fn not_hydrated_until_hydrate_runs() {
    let store = CartStore::new(MemorySlot::new());
    assert!(!store.is_hydrated());
    store.hydrate();
    assert!(store.is_hydrated());
    assert!(store.items().is_empty());
  }

  #[test]
  fn listeners_see_every_mutation_until_unsubscribed() {
    let store = CartStore::new(MemorySlot::new());
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = seen.clone();
    let id = store.subscribe(move |_cart| {
      seen_clone.fetch_add(1, Ordering::SeqCst);
    });

    store.add_item(CartItem::new("A", "Hammer", 20.0, 1));
    store.update_quantity("A", 3);
    assert_eq!(seen.load(Ordering::SeqCst), 2);

    assert!(store.unsubscribe(id));
    store.clear();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn listener_may_read_store_reentrantly() {
    let store = CartStore::new(MemorySlot::new());
    let inner = store.clone();
    let observed_total = Arc::new(RwLock::new(0.0));
    let observed = observed_total.clone();
    store.subscribe(move |_| {
      *observed.write() = inner.total();
    });
    store.add_item(CartItem::new("A", "Level", 15.0, 2));
    assert_eq!(*observed_total.read(), 30.0);
  }

  #[test]
  fn hydrate_restores_persisted_state() {
    let user = Uuid::new_v4();
    let first = CartStore::new(MemorySlot::new());
    first.add_item(CartItem::new("A", "Wrench", 9.5, 2));
    first.set_user_id(Some(user));
    let blob = persist::encode_cart(&first.snapshot()).unwrap();

    let second = CartStore::new(MemorySlot::with_value(blob.clone()));
    second.hydrate();
    assert_eq!(second.snapshot(), decode_cart(&blob).unwrap());
    assert_eq!(second.user_id(), Some(user));
    assert_eq!(second.total(), 19.0);
  }
}
