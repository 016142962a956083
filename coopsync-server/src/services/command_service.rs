use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use coopsync_analyser::{
    positive_amount, pump_run_time, recommended_feed, reset_delay, servo_open_time,
};
use coopsync_api::models::{
    DispenseResponse, DispenseStatus, EventKind, EventRecord, FeedRequest, FeedType,
    FeedingLog, FeedingSettings, WaterLog, WaterRequest, WaterSettings,
};
use coopsync_api::parse::parse_flag;
use coopsync_api::paths::*;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::errors::{CommandError, StoreError};
use crate::services::clock::Clock;
use crate::store::SharedStore;

const FEED_IN_PROGRESS: &str = "A feeding operation is already in progress. Please wait.";
const FEEDER_ACTIVE: &str = "The feeder is currently active. Please wait for it to finish.";
const WATER_IN_PROGRESS: &str = "A water refill is already in progress. Please wait.";
const PUMP_ACTIVE: &str = "The water pump is currently active. Please wait for it to finish.";

/// Holds an in-progress flag for one dispense attempt. Dropping the claim
/// releases the flag unless it was handed over to a reset timer.
struct Claim {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl Claim {
    fn acquire(flag: &Arc<AtomicBool>, busy: &'static str) -> Result<Self, CommandError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CommandError::Busy(busy))?;

        Ok(Self {
            flag: flag.clone(),
            armed: true,
        })
    }

    fn keep(mut self) -> Arc<AtomicBool> {
        self.armed = false;
        self.flag.clone()
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(false, Ordering::SeqCst);
        }
    }
}

/// Sends feed and water commands to the firmware through the store.
///
/// A dispense sets a trigger flag the firmware polls for. The flag is
/// cleared again once the run time plus a buffer has passed, so a missed
/// firmware acknowledgement never leaves the actuator latched.
pub struct CommandService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    reset_buffer: Duration,
    feeding: Arc<AtomicBool>,
    watering: Arc<AtomicBool>,
    pending: Arc<Mutex<HashMap<&'static str, Arc<AtomicBool>>>>,
    timers: Mutex<JoinSet<()>>,
}

impl CommandService {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>, reset_buffer: Duration) -> Self {
        Self {
            store,
            clock,
            reset_buffer,
            feeding: Arc::new(AtomicBool::new(false)),
            watering: Arc::new(AtomicBool::new(false)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            timers: Mutex::new(JoinSet::new()),
        }
    }

    pub fn status(&self) -> DispenseStatus {
        DispenseStatus {
            feeding: self.feeding.load(Ordering::SeqCst),
            watering: self.watering.load(Ordering::SeqCst),
        }
    }

    pub async fn feed(&self, request: FeedRequest) -> Result<DispenseResponse, CommandError> {
        let claim = Claim::acquire(&self.feeding, FEED_IN_PROGRESS)?;
        self.ensure_idle(&[CONTROL_FEED, DEVICE_IS_FEEDING], FEEDER_ACTIVE)
            .await?;

        let stored = FeedingSettings::from_value(&self.store.get(FEEDING_SETTINGS).await?.unwrap_or_default());
        let age_group = request.age_group.unwrap_or(stored.age_group);
        let chicken_count = request.chicken_count.unwrap_or(stored.chicken_count);

        let (grams, feed_type) = match request.grams {
            Some(grams) => (positive_amount(grams)?, FeedType::Custom),
            None => (
                positive_amount(recommended_feed(age_group, chicken_count))?,
                FeedType::Recommended,
            ),
        };

        let servo_seconds = servo_open_time(grams);
        let reset_after = reset_delay(servo_seconds, self.reset_buffer)?;
        let now = self.clock.now().unix_timestamp();

        let settings = FeedingSettings {
            age_group,
            chicken_count,
            last_feed_time: Some(now),
        };
        self.store.set(FEEDING_SETTINGS, to_value(&settings)?).await?;
        self.store.set(CONTROL_FEED_DURATION, json!(servo_seconds)).await?;

        let description = format!(
            "Dispensed {grams:.0}g of feed for {chicken_count} {age_group} chickens ({feed_type} amount)"
        );
        let event = EventRecord {
            timestamp: now,
            kind: EventKind::Feeding.as_str().to_string(),
            description: Some(description.clone()),
        };
        self.store.push(EVENTS, to_value(&event)?).await?;

        let log = FeedingLog {
            timestamp: now,
            grams_dispensed: grams,
            age_group,
            chicken_count,
            servo_open_time: servo_seconds,
            feed_type,
        };
        self.store.push(FEEDING_LOGS, to_value(&log)?).await?;

        self.store.set(CONTROL_FEED, json!(true)).await?;

        self.schedule_reset(CONTROL_FEED, claim, reset_after).await;

        tracing::info!("{}", description);

        Ok(DispenseResponse {
            message: description,
            amount: grams,
            duration_seconds: servo_seconds,
            reset_after_seconds: reset_after.as_secs_f64(),
        })
    }

    pub async fn water(&self, request: WaterRequest) -> Result<DispenseResponse, CommandError> {
        let claim = Claim::acquire(&self.watering, WATER_IN_PROGRESS)?;
        self.ensure_idle(&[CONTROL_WATER_FILL, DEVICE_IS_WATER_FILLING], PUMP_ACTIVE)
            .await?;

        let ml = positive_amount(request.ml)?;
        let stored = WaterSettings::from_value(&self.store.get(WATER_SETTINGS).await?.unwrap_or_default());
        let flow_rate = request.flow_rate.unwrap_or(stored.flow_rate);
        let pump_seconds = pump_run_time(ml, flow_rate)?;
        let reset_after = reset_delay(pump_seconds, self.reset_buffer)?;

        let now = self.clock.now().unix_timestamp();

        self.store.set(WATER_FLOW_RATE, json!(flow_rate)).await?;
        // Firmware reads the fill duration as whole seconds.
        self.store
            .set(WATER_FILL_DURATION, json!(pump_seconds.ceil() as u64))
            .await?;

        let description = format!("Dispensed {ml:.0}ml of water over {pump_seconds:.1}s");
        let event = EventRecord {
            timestamp: now,
            kind: EventKind::Watering.as_str().to_string(),
            description: Some(description.clone()),
        };
        self.store.push(EVENTS, to_value(&event)?).await?;

        let log = WaterLog {
            timestamp: now,
            volume_dispensed: ml,
            duration_seconds: pump_seconds,
            flow_rate,
        };
        self.store.push(WATER_LOGS, to_value(&log)?).await?;

        self.store.set(CONTROL_WATER_FILL, json!(true)).await?;

        self.schedule_reset(CONTROL_WATER_FILL, claim, reset_after).await;

        tracing::info!("{}", description);

        Ok(DispenseResponse {
            message: description,
            amount: ml,
            duration_seconds: pump_seconds,
            reset_after_seconds: reset_after.as_secs_f64(),
        })
    }

    /// Clears every pending trigger right away and cancels the timers.
    pub async fn shutdown(&self) {
        self.timers.lock().await.shutdown().await;

        let pending: Vec<(&'static str, Arc<AtomicBool>)> =
            self.pending.lock().await.drain().collect();

        for (trigger, flag) in pending {
            if let Err(e) = self.store.set(trigger, json!(false)).await {
                tracing::error!("Failed to reset {} on shutdown: {}", trigger, e);
            }
            flag.store(false, Ordering::SeqCst);
        }
    }

    async fn ensure_idle(&self, paths: &[&str], busy: &'static str) -> Result<(), CommandError> {
        for path in paths {
            let active = self
                .store
                .get(path)
                .await?
                .as_ref()
                .and_then(parse_flag)
                .unwrap_or(false);

            if active {
                return Err(CommandError::Busy(busy));
            }
        }

        Ok(())
    }

    async fn schedule_reset(&self, trigger: &'static str, claim: Claim, delay: Duration) {
        let flag = claim.keep();
        self.pending.lock().await.insert(trigger, flag.clone());

        let store = self.store.clone();
        let pending = self.pending.clone();

        let mut timers = self.timers.lock().await;
        while timers.try_join_next().is_some() {}

        timers.spawn(async move {
            tokio::time::sleep(delay).await;

            if let Err(e) = store.set(trigger, json!(false)).await {
                tracing::error!("Failed to reset {}: {}", trigger, e);
            }

            pending.lock().await.remove(trigger);
            flag.store(false, Ordering::SeqCst);
        });
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}
