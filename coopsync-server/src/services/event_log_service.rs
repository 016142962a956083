use std::sync::Arc;

use coopsync_analyser::{Calendar, event_entries, select_events};
use coopsync_api::models::{EventEntry, EventFilter, EventListResponse};
use coopsync_api::paths::{EVENTS, child};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::errors::EventError;
use crate::services::clock::Clock;
use crate::store::{Query, SharedStore};

/// Mirrors the newest events and serves the filtered log.
pub struct EventLogService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    calendar: Calendar,
    limit: usize,
    visible: usize,
    entries: Arc<RwLock<Option<Vec<EventEntry>>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl EventLogService {
    pub fn new(
        store: SharedStore,
        clock: Arc<dyn Clock>,
        calendar: Calendar,
        limit: usize,
        visible: usize,
    ) -> Self {
        Self {
            store,
            clock,
            calendar,
            limit,
            visible,
            entries: Arc::new(RwLock::new(None)),
            task: Mutex::new(None),
        }
    }

    fn query(&self) -> Query {
        Query::last("timestamp", self.limit)
    }

    pub async fn start(&self) -> Result<(), EventError> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return Ok(());
        }

        let mut subscription = self.store.subscribe(EVENTS, Some(self.query())).await?;
        *self.entries.write().await = Some(
            subscription
                .current()
                .map(|node| event_entries(&node))
                .unwrap_or_default(),
        );

        let entries = self.entries.clone();
        *task = Some(tokio::spawn(async move {
            loop {
                match subscription.changed().await {
                    Ok(node) => {
                        let next = node.map(|node| event_entries(&node)).unwrap_or_default();
                        *entries.write().await = Some(next);
                    }
                    Err(e) => {
                        tracing::warn!("Event log subscription ended: {}", e);
                        // Fall back to reading on demand.
                        *entries.write().await = None;
                        return;
                    }
                }
            }
        }));

        Ok(())
    }

    pub async fn stop(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
        *self.entries.write().await = None;
    }

    async fn entries(&self) -> Result<Vec<EventEntry>, EventError> {
        if let Some(entries) = self.entries.read().await.as_ref() {
            return Ok(entries.clone());
        }

        let node = self.store.query(EVENTS, &self.query()).await?;
        Ok(node.map(|node| event_entries(&node)).unwrap_or_default())
    }

    pub async fn list(&self, filter: EventFilter, show_all: bool) -> Result<EventListResponse, EventError> {
        let entries = self.entries().await?;
        let mut events = select_events(&entries, filter, self.clock.now(), &self.calendar);

        let total = events.len();
        if !show_all {
            events.truncate(self.visible);
        }

        Ok(EventListResponse {
            filter,
            total,
            hidden: total - events.len(),
            show_all,
            events,
        })
    }

    /// Removes the event locally first, then from the store. A failed store
    /// delete is reported but the local removal stays.
    pub async fn delete(&self, id: &str) -> Result<(), EventError> {
        if !is_valid_key(id) {
            return Err(EventError::InvalidKey(id.to_string()));
        }

        if let Some(entries) = self.entries.write().await.as_mut() {
            entries.retain(|entry| entry.id != id);
        }

        self.store.remove(&child(EVENTS, id)).await?;
        tracing::info!("Deleted event {}", id);

        Ok(())
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['/', '.', '#', '$', '[', ']'])
}

#[cfg(test)]
mod tests {
    use coopsync_analyser::SECONDS_PER_DAY;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use super::*;
    use crate::errors::StoreError;
    use crate::services::clock::FixedClock;
    use crate::store::{MemoryStore, RealtimeStore};

    const NOW: i64 = 1710504000;

    fn events(count: i64) -> Value {
        let mut node = serde_json::Map::new();
        for i in 0..count {
            node.insert(
                format!("event{i:03}"),
                json!({ "timestamp": NOW - i * 3600, "type": "lowFood" }),
            );
        }
        json!({ "events": node })
    }

    fn service(store: &MemoryStore, limit: usize) -> EventLogService {
        EventLogService::new(
            Arc::new(store.clone()),
            Arc::new(FixedClock::new(datetime!(2024-03-15 12:00 UTC))),
            Calendar::default(),
            limit,
            15,
        )
    }

    #[tokio::test]
    async fn test_list_collapses_to_visible() {
        let store = MemoryStore::with_data(events(40));
        let log = service(&store, 100);

        let collapsed = log.list(EventFilter::All, false).await.unwrap();
        assert_eq!(collapsed.total, 40);
        assert_eq!(collapsed.hidden, 25);
        assert_eq!(collapsed.events.len(), 15);
        assert_eq!(collapsed.events[0].timestamp, NOW);

        let expanded = log.list(EventFilter::All, true).await.unwrap();
        assert_eq!(expanded.hidden, 0);
        assert_eq!(expanded.events.len(), 40);
    }

    #[tokio::test]
    async fn test_list_respects_cap_and_filter() {
        let store = MemoryStore::with_data(events(40));
        let log = service(&store, 30);

        let all = log.list(EventFilter::All, true).await.unwrap();
        assert_eq!(all.total, 30);

        // Local midnight is 12 hours back, so the events at 0..=12 hours remain.
        let today = log.list(EventFilter::Day, true).await.unwrap();
        assert_eq!(today.total, 13);
        assert!(today.events.iter().all(|e| e.timestamp >= NOW - SECONDS_PER_DAY / 2));
    }

    #[tokio::test]
    async fn test_mirror_follows_new_events() {
        let store = MemoryStore::with_data(events(2));
        let log = service(&store, 100);
        log.start().await.unwrap();

        store
            .push(EVENTS, json!({ "timestamp": NOW + 60, "type": "highTemperature" }))
            .await
            .unwrap();
        tokio::task::yield_now().await;

        let mut latest = log.list(EventFilter::All, true).await.unwrap();
        for _ in 0..10 {
            if latest.total == 3 {
                break;
            }
            tokio::task::yield_now().await;
            latest = log.list(EventFilter::All, true).await.unwrap();
        }

        assert_eq!(latest.total, 3);
        assert_eq!(latest.events[0].kind, "highTemperature");
        log.stop().await;
    }

    #[tokio::test]
    async fn test_delete_is_optimistic() {
        let store = MemoryStore::with_data(events(3));
        let log = service(&store, 100);
        log.start().await.unwrap();
        store.reject_writes(EVENTS).await;

        let result = log.delete("event001").await;

        assert!(matches!(result, Err(EventError::Store(StoreError::Rejected(_)))));
        let listed = log.list(EventFilter::All, true).await.unwrap();
        assert!(listed.events.iter().all(|e| e.id != "event001"));
        log.stop().await;
    }

    #[tokio::test]
    async fn test_delete_rejects_path_keys() {
        let store = MemoryStore::with_data(events(1));
        let log = service(&store, 100);

        assert!(matches!(log.delete("../sensors").await, Err(EventError::InvalidKey(_))));
        assert!(matches!(log.delete("").await, Err(EventError::InvalidKey(_))));

        log.delete("event000").await.unwrap();
        assert_eq!(store.get(EVENTS).await.unwrap(), None);
    }
}
