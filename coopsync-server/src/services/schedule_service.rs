use coopsync_api::models::{FeedingSettings, ScheduleKind, ScheduleResponse, ScheduleSlot, WaterSettings};
use coopsync_api::parse::parse_flag;
use coopsync_api::paths::{FEEDING_SETTINGS, WATER_SETTINGS, child};
use coopsync_analyser::children;
use serde_json::{Map, Value, json};

use crate::errors::{SettingError, StoreError};
use crate::store::SharedStore;

const HOURS: u8 = 24;

/// Hourly feeding and watering plans, and the dispenser settings the
/// firmware reads.
pub struct ScheduleService {
    store: SharedStore,
}

fn check_hour(hour: u8) -> Result<(), SettingError> {
    if hour < HOURS {
        Ok(())
    } else {
        Err(SettingError::InvalidHour(hour))
    }
}

impl ScheduleService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Every hour of the day; hours without a parsable flag are disabled.
    pub async fn get_schedule(&self, kind: ScheduleKind) -> Result<ScheduleResponse, SettingError> {
        let node = self.store.get(kind.path()).await?.unwrap_or_default();

        let mut slots: Vec<ScheduleSlot> = (0..HOURS)
            .map(|hour| ScheduleSlot { hour, enabled: false })
            .collect();

        for (key, value) in children(&node) {
            let Some(hour) = key.parse::<u8>().ok().filter(|hour| *hour < HOURS) else {
                continue;
            };
            slots[hour as usize].enabled = parse_flag(value).unwrap_or(false);
        }

        Ok(ScheduleResponse { kind, slots })
    }

    pub async fn get_slot(&self, kind: ScheduleKind, hour: u8) -> Result<ScheduleSlot, SettingError> {
        check_hour(hour)?;

        let enabled = self
            .store
            .get(&child(kind.path(), hour))
            .await?
            .as_ref()
            .and_then(parse_flag)
            .unwrap_or(false);

        Ok(ScheduleSlot { hour, enabled })
    }

    pub async fn set_slot(&self, kind: ScheduleKind, hour: u8, enabled: bool) -> Result<ScheduleSlot, SettingError> {
        check_hour(hour)?;

        self.store.set(&child(kind.path(), hour), json!(enabled)).await?;
        tracing::info!("{:?} schedule at {:02}:00 set to {}", kind, hour, enabled);

        Ok(ScheduleSlot { hour, enabled })
    }

    pub async fn water_settings(&self) -> Result<WaterSettings, SettingError> {
        let node = self.store.get(WATER_SETTINGS).await?.unwrap_or_default();
        Ok(WaterSettings::from_value(&node))
    }

    /// Writes the three fields, leaving anything else the firmware keeps
    /// under the same node.
    pub async fn set_water_settings(&self, settings: WaterSettings) -> Result<WaterSettings, SettingError> {
        if !settings.flow_rate.is_finite() || settings.flow_rate <= 0.0 {
            return Err(SettingError::InvalidFlowRate);
        }

        let fields = to_fields(&settings)?;
        self.store.update(WATER_SETTINGS, fields).await?;

        Ok(settings)
    }

    pub async fn feeding_settings(&self) -> Result<FeedingSettings, SettingError> {
        let node = self.store.get(FEEDING_SETTINGS).await?.unwrap_or_default();
        Ok(FeedingSettings::from_value(&node))
    }

    pub async fn set_feeding_settings(&self, settings: FeedingSettings) -> Result<FeedingSettings, SettingError> {
        if settings.chicken_count < 1 {
            return Err(SettingError::InvalidChickenCount);
        }

        let fields = to_fields(&settings)?;
        self.store.update(FEEDING_SETTINGS, fields).await?;

        Ok(settings)
    }
}

fn to_fields<T: serde::Serialize>(value: &T) -> Result<Map<String, Value>, SettingError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Malformed(format!("expected an object, got {other}")).into()),
        Err(e) => Err(StoreError::Malformed(e.to_string()).into()),
    }
}
