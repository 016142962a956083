use std::sync::Arc;

use coopsync_api::models::{AlertFlags, ControlFlags, DashboardSnapshot, DeviceStates, SensorReadings};
use coopsync_api::paths::{ALERTS, CONTROLS, DEVICE_STATES, SENSORS};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::errors::StoreError;
use crate::services::clock::Clock;
use crate::store::{SharedStore, Subscription};

const SECTIONS: [&str; 4] = [SENSORS, ALERTS, CONTROLS, DEVICE_STATES];

/// Keeps a local copy of the live dashboard nodes and republishes it on
/// every change.
pub struct MirrorService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    sender: watch::Sender<DashboardSnapshot>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl MirrorService {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        let (sender, _) = watch::channel(DashboardSnapshot::default());

        Self {
            store,
            clock,
            sender,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.sender.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
        self.sender.subscribe()
    }

    /// Subscribes to every dashboard node. Does nothing when already running.
    pub async fn start(&self) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().await;
        if !tasks.is_empty() {
            return Ok(());
        }

        let mut subscriptions = Vec::with_capacity(SECTIONS.len());
        for path in SECTIONS {
            match self.store.subscribe(path, None).await {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => {
                    self.set_connected(false);
                    return Err(e);
                }
            }
        }

        for subscription in subscriptions {
            self.apply(subscription.path(), subscription.current().as_ref(), true);
            tasks.push(tokio::spawn(follow(
                subscription,
                self.sender.clone(),
                self.clock.clone(),
            )));
        }

        tracing::info!("Dashboard mirror started");
        Ok(())
    }

    /// Reads every node once and starts the subscriptions if they are not
    /// running yet.
    pub async fn refresh(&self) -> Result<DashboardSnapshot, StoreError> {
        for path in SECTIONS {
            match self.store.get(path).await {
                Ok(value) => self.apply(path, value.as_ref(), true),
                Err(e) => {
                    self.set_connected(false);
                    return Err(e);
                }
            }
        }

        self.start().await?;
        Ok(self.snapshot())
    }

    pub async fn stop(&self) {
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
    }

    fn apply(&self, path: &str, value: Option<&Value>, connected: bool) {
        let now = self.clock.now().unix_timestamp();
        self.sender
            .send_modify(|snapshot| apply_section(snapshot, path, value, connected, now));
    }

    fn set_connected(&self, connected: bool) {
        self.sender.send_if_modified(|snapshot| {
            let changed = snapshot.connected != connected;
            snapshot.connected = connected;
            changed
        });
    }
}

async fn follow(
    mut subscription: Subscription,
    sender: watch::Sender<DashboardSnapshot>,
    clock: Arc<dyn Clock>,
) {
    loop {
        match subscription.changed().await {
            Ok(value) => {
                let now = clock.now().unix_timestamp();
                sender.send_modify(|snapshot| {
                    apply_section(snapshot, subscription.path(), value.as_ref(), true, now)
                });
            }
            Err(e) => {
                tracing::warn!("Dashboard mirror lost {}: {}", subscription.path(), e);
                sender.send_modify(|snapshot| snapshot.connected = false);
                return;
            }
        }
    }
}

pub fn apply_section(
    snapshot: &mut DashboardSnapshot,
    path: &str,
    value: Option<&Value>,
    connected: bool,
    now: i64,
) {
    let value = value.unwrap_or(&Value::Null);

    match path {
        SENSORS => snapshot.sensors = SensorReadings::from_value(value),
        ALERTS => snapshot.alerts = AlertFlags::from_value(value),
        CONTROLS => snapshot.controls = ControlFlags::from_value(value),
        DEVICE_STATES => snapshot.devices = DeviceStates::from_value(value),
        other => {
            tracing::debug!("Ignoring update for {}", other);
            return;
        }
    }

    snapshot.connected = connected;
    snapshot.updated_at = Some(now);
}
