use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, watch};

use super::tree::{limit_to_last, read_node, segments, write_node};
use super::{Query, RealtimeStore, Subscription};
use crate::errors::StoreError;

/// Most recent writes kept in the journal.
pub const JOURNAL_CAPACITY: usize = 1024;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Set,
    Update,
    Push,
    Remove,
}

/// A write as it reached the store, kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteRecord {
    pub op: WriteOp,
    pub path: String,
    pub value: Value,
}

struct Watcher {
    segments: Vec<String>,
    query: Option<Query>,
    sender: watch::Sender<Option<Value>>,
}

#[derive(Default)]
struct Inner {
    root: Value,
    watchers: Vec<Watcher>,
    writes: VecDeque<WriteRecord>,
    push_seq: u64,
    offline: bool,
    rejected: Vec<Vec<String>>,
}

impl Inner {
    fn view(&self, segments: &[String], query: Option<&Query>) -> Option<Value> {
        let node = read_node(&self.root, segments)?;

        match query {
            Some(query) => limit_to_last(node, query),
            None => Some(node.clone()),
        }
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }

    fn check_writable(&self, path: &[String]) -> Result<(), StoreError> {
        self.check_online()?;

        if self.rejected.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(StoreError::Rejected(format!(
                "permission denied at /{}",
                path.join("/")
            )));
        }
        Ok(())
    }

    fn write(&mut self, op: WriteOp, path: &str, value: Value) {
        let target = segments(path);
        write_node(&mut self.root, &target, value.clone());

        self.record(op, path, value);
        self.notify(&target);
    }

    fn record(&mut self, op: WriteOp, path: &str, value: Value) {
        if self.writes.len() == JOURNAL_CAPACITY {
            self.writes.pop_front();
        }

        self.writes.push_back(WriteRecord {
            op,
            path: path.to_string(),
            value,
        });
    }

    fn notify(&mut self, changed: &[String]) {
        self.watchers.retain(|watcher| !watcher.sender.is_closed());

        let views: Vec<Option<Option<Value>>> = self
            .watchers
            .iter()
            .map(|watcher| {
                let related = watcher.segments.starts_with(changed) || changed.starts_with(&watcher.segments);
                related.then(|| self.view(&watcher.segments, watcher.query.as_ref()))
            })
            .collect();

        for (watcher, view) in self.watchers.iter().zip(views) {
            let Some(view) = view else { continue };

            watcher.sender.send_if_modified(|current| {
                if *current == view {
                    false
                } else {
                    *current = view;
                    true
                }
            });
        }
    }

    fn next_push_key(&mut self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();

        self.push_seq += 1;
        push_key(millis, self.push_seq)
    }
}

/// Generates a key that sorts after every key generated before it: eight
/// characters of time followed by twelve of sequence.
pub fn push_key(millis: u64, seq: u64) -> String {
    let encode = |mut value: u64, len: usize| {
        let mut chars = vec![b'-'; len];
        for slot in chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(value % 64) as usize];
            value /= 64;
        }
        chars
    };

    let mut key = encode(millis, 8);
    key.extend(encode(seq, 12));
    String::from_utf8_lossy(&key).into_owned()
}

/// Process-local store with the same key-path semantics as the hosted
/// database. Keeps a journal of the most recent writes, and can be switched
/// offline or made to reject writes under a path.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(root: Value) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                root,
                ..Inner::default()
            })),
        }
    }

    pub async fn snapshot(&self) -> Value {
        self.inner.lock().await.root.clone()
    }

    pub async fn writes(&self) -> Vec<WriteRecord> {
        self.inner.lock().await.writes.iter().cloned().collect()
    }

    pub async fn clear_writes(&self) {
        self.inner.lock().await.writes.clear();
    }

    pub async fn set_offline(&self, offline: bool) {
        self.inner.lock().await.offline = offline;
    }

    /// Makes every write at or below `path` fail as rejected.
    pub async fn reject_writes(&self, path: &str) {
        self.inner.lock().await.rejected.push(segments(path));
    }
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock().await;
        inner.check_online()?;

        Ok(inner.view(&segments(path), None))
    }

    async fn query(&self, path: &str, query: &Query) -> Result<Option<Value>, StoreError> {
        let inner = self.inner.lock().await;
        inner.check_online()?;

        Ok(inner.view(&segments(path), Some(query)))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check_writable(&segments(path))?;

        inner.write(WriteOp::Set, path, value);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check_writable(&segments(path))?;

        let base = segments(path);
        for (key, value) in &fields {
            let mut target = base.clone();
            target.extend(segments(key));
            write_node(&mut inner.root, &target, value.clone());
        }

        inner.record(WriteOp::Update, path, Value::Object(fields));
        inner.notify(&base);

        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check_writable(&segments(path))?;

        let key = inner.next_push_key();
        let child = format!("{}/{}", path.trim_end_matches('/'), key);

        let target = segments(&child);
        write_node(&mut inner.root, &target, value.clone());
        inner.record(WriteOp::Push, path, value);
        inner.notify(&target);

        Ok(key)
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check_writable(&segments(path))?;

        inner.write(WriteOp::Remove, path, Value::Null);
        Ok(())
    }

    async fn subscribe(&self, path: &str, query: Option<Query>) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.check_online()?;

        let target = segments(path);
        let (sender, receiver) = watch::channel(inner.view(&target, query.as_ref()));

        inner.watchers.push(Watcher {
            segments: target,
            query,
            sender,
        });

        Ok(Subscription::new(path, receiver, None))
    }
}
