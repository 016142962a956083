//! Key-path access to the realtime database shared with the coop firmware.

mod firebase;
mod memory;
mod sse;
mod tree;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use firebase::FirebaseStore;
pub use memory::{MemoryStore, WriteOp, WriteRecord};
pub use sse::{SseEvent, SseParser};
pub use tree::{limit_to_last, read_node, segments, write_node};

use crate::configs::{Store, StoreKind};
use crate::errors::StoreError;

/// Server-side filter keeping the last `limit_to_last` children ordered by
/// the `order_by` child key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub order_by: String,
    pub limit_to_last: usize,
}

impl Query {
    pub fn last(order_by: &str, limit_to_last: usize) -> Self {
        Self {
            order_by: order_by.to_string(),
            limit_to_last,
        }
    }
}

#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Reads the node at `path`; `None` when nothing is stored there.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    async fn query(&self, path: &str, query: &Query) -> Result<Option<Value>, StoreError>;

    /// Replaces the node at `path`. Writing `null` removes it.
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Replaces the listed children of `path`, leaving the others.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Adds a child under a generated, chronologically ordered key.
    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError>;

    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Watches `path`. The handle publishes the full node after every
    /// change and stops watching when dropped.
    async fn subscribe(&self, path: &str, query: Option<Query>) -> Result<Subscription, StoreError>;
}

pub type SharedStore = Arc<dyn RealtimeStore>;

pub fn create_store(settings: &Store) -> Result<SharedStore, StoreError> {
    Ok(match settings.kind {
        StoreKind::Firebase => Arc::new(FirebaseStore::new(settings)?),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    })
}

/// Live view of one store node.
pub struct Subscription {
    path: String,
    receiver: watch::Receiver<Option<Value>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(
        path: &str,
        receiver: watch::Receiver<Option<Value>>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            path: path.to_string(),
            receiver,
            task,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last value seen, without waiting.
    pub fn current(&self) -> Option<Value> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next change of the node.
    pub async fn changed(&mut self) -> Result<Option<Value>, StoreError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::SubscriptionClosed(self.path.clone()))?;

        Ok(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
