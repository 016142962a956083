use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parse::{flag_field, number_field, timestamp_field};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    /// Air temperature in Celsius
    pub temperature: Option<f64>,
    /// Relative humidity percentage
    pub humidity: Option<f64>,
    /// Feeder hopper level percentage
    pub food_level: Option<f64>,
    /// Main tank level percentage
    pub water_level_main: Option<f64>,
    /// Drinker level percentage
    pub water_level_drinker: Option<f64>,
    /// Firmware write time in epoch seconds
    pub timestamp: Option<i64>,
}

impl SensorReadings {
    pub fn from_value(value: &Value) -> Self {
        Self {
            temperature: number_field(value, "temperature"),
            humidity: number_field(value, "humidity"),
            food_level: number_field(value, "foodLevel"),
            water_level_main: number_field(value, "waterLevelMain"),
            water_level_drinker: number_field(value, "waterLevelDrinker"),
            timestamp: timestamp_field(value, "timestamp"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFlags {
    pub high_temperature: bool,
    pub low_temperature: bool,
    pub low_food: bool,
    pub low_water_main: bool,
    pub low_water_drinker: bool,
    pub low_hydration: bool,
}

impl AlertFlags {
    pub fn from_value(value: &Value) -> Self {
        let flag = |key| flag_field(value, key).unwrap_or(false);

        Self {
            high_temperature: flag("highTemperature"),
            low_temperature: flag("lowTemperature"),
            low_food: flag("lowFood"),
            low_water_main: flag("lowWaterMain"),
            low_water_drinker: flag("lowWaterDrinker"),
            low_hydration: flag("lowHydration"),
        }
    }

    pub fn any(&self) -> bool {
        self.high_temperature
            || self.low_temperature
            || self.low_food
            || self.low_water_main
            || self.low_water_drinker
            || self.low_hydration
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFlags {
    pub fan: bool,
    pub heat: bool,
    pub pump: bool,
    pub feed: bool,
    pub water_fill: bool,
    pub automation_enabled: bool,
    /// Seconds the feeder servo stays open on the next trigger
    pub feed_duration: Option<f64>,
}

impl ControlFlags {
    pub fn from_value(value: &Value) -> Self {
        let flag = |key| flag_field(value, key).unwrap_or(false);

        Self {
            fan: flag("fan"),
            heat: flag("heat"),
            pump: flag("pump"),
            feed: flag("feed"),
            water_fill: flag("waterFill"),
            automation_enabled: flag("automationEnabled"),
            feed_duration: number_field(value, "feedDuration"),
        }
    }
}

/// Actuator state as reported back by the firmware.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStates {
    pub fan: Option<bool>,
    pub heat: Option<bool>,
    pub pump: Option<bool>,
    pub is_feeding: Option<bool>,
    pub is_water_filling: Option<bool>,
}

impl DeviceStates {
    pub fn from_value(value: &Value) -> Self {
        // Relay outputs are active-low, so the raw pin level is inverted.
        let relay = |key| flag_field(value, key).map(|level| !level);

        Self {
            fan: relay("fan"),
            heat: relay("heat"),
            pump: relay("pump"),
            is_feeding: flag_field(value, "isFeeding"),
            is_water_filling: flag_field(value, "isWaterFilling"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Whether the last read from the store succeeded
    pub connected: bool,
    pub sensors: SensorReadings,
    pub alerts: AlertFlags,
    pub controls: ControlFlags,
    pub devices: DeviceStates,
    /// Epoch seconds of the last applied update
    pub updated_at: Option<i64>,
}
