// core/src/sync/worker.rs

//! Background mirror of local cart mutations to the remote gateway.
//!
//! A single task drains an unbounded queue in FIFO order, so writes for one
//! user reach the remote in the order they were issued. Failed writes are
//! logged and dropped; the local cart is never rolled back.

use crate::cart::CartItem;
use crate::gateway::{CartDelta, CartGateway};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncTask {
  SaveFull { user_id: Uuid, items: Vec<CartItem> },
  Delta { user_id: Uuid, delta: CartDelta },
}

impl SyncTask {
  pub fn user_id(&self) -> Uuid {
    match self {
      SyncTask::SaveFull { user_id, .. } | SyncTask::Delta { user_id, .. } => *user_id,
    }
  }

  fn is_full_save_for(&self, user: Uuid) -> bool {
    matches!(self, SyncTask::SaveFull { user_id, .. } if *user_id == user)
  }
}

enum Command {
  Task(SyncTask),
  Flush(oneshot::Sender<()>),
  Shutdown(oneshot::Sender<()>),
}

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Default)]
pub struct SyncStats {
  pub applied: AtomicU64,
  pub failed: AtomicU64,
  pub superseded: AtomicU64,
}

/// Cloneable sender side of the sync worker.
#[derive(Clone)]
pub struct SyncHandle {
  tx: mpsc::UnboundedSender<Command>,
  stats: Arc<SyncStats>,
}

impl SyncHandle {
  /// Queues a remote write. Never blocks and never fails the caller.
  pub fn enqueue(&self, task: SyncTask) {
    if self.tx.send(Command::Task(task)).is_err() {
      warn!("Sync worker has stopped; dropping remote cart write.");
    }
  }

  /// Resolves once every task queued before this call has been attempted.
  pub async fn flush(&self) {
    let (ack_tx, ack_rx) = oneshot::channel();
    if self.tx.send(Command::Flush(ack_tx)).is_ok() {
      let _ = ack_rx.await;
    }
  }

  /// Drains the queue and stops the worker.
  pub async fn shutdown(&self) {
    let (ack_tx, ack_rx) = oneshot::channel();
    if self.tx.send(Command::Shutdown(ack_tx)).is_ok() {
      let _ = ack_rx.await;
    }
  }

  pub fn stats(&self) -> &SyncStats {
    &self.stats
  }
}

pub struct SyncWorker {
  gateway: Arc<dyn CartGateway>,
  rx: mpsc::UnboundedReceiver<Command>,
  stats: Arc<SyncStats>,
}

impl SyncWorker {
  /// Spawns the worker on the current tokio runtime.
  pub fn spawn(gateway: Arc<dyn CartGateway>) -> SyncHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let stats = Arc::new(SyncStats::default());
    let worker = SyncWorker {
      gateway,
      rx,
      stats: stats.clone(),
    };
    tokio::spawn(worker.run());
    SyncHandle { tx, stats }
  }

  async fn run(mut self) {
    debug!("Cart sync worker started.");
    while let Some(first) = self.rx.recv().await {
      let mut batch = vec![first];
      while let Ok(more) = self.rx.try_recv() {
        batch.push(more);
      }
      if self.process(batch).await {
        break;
      }
    }
    info!(
      applied = self.stats.applied.load(Ordering::Relaxed),
      failed = self.stats.failed.load(Ordering::Relaxed),
      "Cart sync worker stopped."
    );
  }

  /// Returns `true` once a shutdown command has been handled.
  async fn process(&mut self, batch: Vec<Command>) -> bool {
    let mut pending: Vec<SyncTask> = Vec::new();
    let mut stop = false;
    for command in batch {
      match command {
        Command::Task(task) => pending.push(task),
        Command::Flush(ack) => {
          self.execute(std::mem::take(&mut pending)).await;
          let _ = ack.send(());
        }
        Command::Shutdown(ack) => {
          self.execute(std::mem::take(&mut pending)).await;
          let _ = ack.send(());
          stop = true;
          break;
        }
      }
    }
    if !stop {
      self.execute(pending).await;
    }
    stop
  }

  async fn execute(&self, tasks: Vec<SyncTask>) {
    let kept = coalesce(tasks);
    for task in kept.tasks {
      self.apply(task).await;
    }
    if kept.superseded > 0 {
      self.stats.superseded.fetch_add(kept.superseded as u64, Ordering::Relaxed);
      debug!(superseded = kept.superseded, "Dropped queued cart writes superseded by a full save.");
    }
  }

  async fn apply(&self, task: SyncTask) {
    let user_id = task.user_id();
    let result = match &task {
      SyncTask::SaveFull { user_id, items } => self.gateway.save_full(*user_id, items).await,
      SyncTask::Delta { user_id, delta } => self.gateway.apply_delta(*user_id, delta).await.map(|_| ()),
    };
    match result {
      Ok(()) => {
        self.stats.applied.fetch_add(1, Ordering::Relaxed);
        debug!(%user_id, "Remote cart write applied.");
      }
      Err(e) => {
        self.stats.failed.fetch_add(1, Ordering::Relaxed);
        warn!(%user_id, error = %e, "Remote cart write failed; local cart unchanged.");
      }
    }
  }
}

struct Coalesced {
  tasks: Vec<SyncTask>,
  superseded: usize,
}

/// A full save replaces the whole remote cart, so any task for the same user
/// queued before it is dead weight.
fn coalesce(tasks: Vec<SyncTask>) -> Coalesced {
  let mut kept = Vec::with_capacity(tasks.len());
  let mut superseded = 0;
  for (idx, task) in tasks.iter().enumerate() {
    let user = task.user_id();
    if tasks[idx + 1..].iter().any(|later| later.is_full_save_for(user)) {
      superseded += 1;
    } else {
      kept.push(task.clone());
    }
  }
  Coalesced { tasks: kept, superseded }
}
