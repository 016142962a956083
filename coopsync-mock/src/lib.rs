use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use coopsync_api::models::{ControlFlags, EventRecord, WaterSettings};
use coopsync_api::paths::{
    ALERTS, CONTROLS, DEVICE_STATES, EVENTS, FEEDING_LOGS, HISTORY, SENSORS, WATER_LOGS,
    WATER_SETTINGS,
};
use coopsync_server::errors::StoreError;
use coopsync_server::store::{SharedStore, create_store};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::settings::Settings;
use crate::simulate::{
    Coop, Noise, day_fraction, sample_feeding_log, sample_history, sample_water_log,
    simulated_humidity, simulated_temperature,
};

pub mod settings;
pub mod simulate;

const SECONDS_PER_HOUR: i64 = 3600;

pub async fn run(settings: &Arc<Settings>) -> Result<(), Box<dyn Error>> {
    let store = create_store(&settings.store)?;
    let mut rng = StdRng::from_os_rng();
    let interval_secs = settings.mock.interval_secs.max(1);
    let noise = Noise::new(interval_secs)?;

    let now = OffsetDateTime::now_utc().unix_timestamp();
    seed(&store, &mut rng, settings.mock.seed_hours, now).await?;

    let mut coop = Coop::default();
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let history_every = (SECONDS_PER_HOUR as u64 / interval_secs).max(1);
    let mut index: u64 = 0;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let record_history = index % history_every == 0;

                if let Err(e) = step(&store, &mut coop, &noise, &mut rng, record_history).await {
                    tracing::warn!("Reading {} not written: {}", index, e);
                }

                index += 1;
            }
            _ = &mut shutdown => {
                tracing::info!("Simulator stopped after {} readings", index);
                return Ok(());
            }
        }
    }
}

/// Writes `hours` of hourly sample logs ending at `now`.
pub async fn seed(store: &SharedStore, rng: &mut StdRng, hours: u32, now: i64) -> Result<(), StoreError> {
    let flow_rate =
        WaterSettings::from_value(&store.get(WATER_SETTINGS).await?.unwrap_or_default()).flow_rate;

    for hour in (0..hours as i64).rev() {
        let timestamp = now - hour * SECONDS_PER_HOUR;

        store.push(FEEDING_LOGS, to_value(&sample_feeding_log(rng, timestamp))?).await?;
        store.push(WATER_LOGS, to_value(&sample_water_log(rng, timestamp, flow_rate))?).await?;
        store.push(HISTORY, to_value(&sample_history(rng, timestamp))?).await?;
    }

    tracing::info!("Seeded {} hours of sample logs", hours);
    Ok(())
}

async fn step(
    store: &SharedStore,
    coop: &mut Coop,
    noise: &Noise,
    rng: &mut StdRng,
    record_history: bool,
) -> Result<(), StoreError> {
    let controls = ControlFlags::from_value(&store.get(CONTROLS).await?.unwrap_or_default());
    let water = WaterSettings::from_value(&store.get(WATER_SETTINGS).await?.unwrap_or_default());

    let now = OffsetDateTime::now_utc();
    let fraction = day_fraction(
        now.hour() as u32 * 3600 + now.minute() as u32 * 60 + now.second() as u32,
    );
    let temperature = simulated_temperature(fraction) + noise.temperature(rng);
    let humidity = (simulated_humidity(fraction) + noise.humidity(rng)).clamp(0.0, 100.0);

    let (food, drink) = noise.consumption(rng);
    coop.levels.consume(food, drink);
    if coop.levels.restock() {
        tracing::info!("Farmer refilled the coop");
    }

    let before = coop.alert_flags().clone();
    let reading = coop.advance(now.unix_timestamp(), temperature, humidity, &controls, &water);

    store.set(SENSORS, reading.sensors()).await?;
    store.set(ALERTS, reading.alerts()).await?;
    store.set(DEVICE_STATES, reading.device_states()).await?;

    for kind in Coop::raised_alerts(&before, &reading.alerts) {
        let event = EventRecord {
            timestamp: reading.timestamp,
            kind: kind.as_str().to_string(),
            description: Some(kind.default_description().to_string()),
        };
        store.push(EVENTS, to_value(&event)?).await?;
        tracing::info!("Raised {}", kind.as_str());
    }

    if record_history {
        store.push(HISTORY, to_value(&reading.history())?).await?;
    }

    tracing::debug!("Send: {}", reading.sensors());
    Ok(())
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}
