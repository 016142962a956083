use std::f64::consts::PI;

use coopsync_analyser::{SERVO_SECONDS_PER_GRAM, servo_open_time};
use coopsync_api::models::{
    AgeGroup, AlertFlags, ControlFlags, EventKind, FeedType, FeedingLog, HistoryRecord, WaterLog,
    WaterSettings,
};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_json::{Value, json};

pub const TEMP_HIGH_THRESHOLD: f64 = 32.0;
pub const TEMP_LOW_THRESHOLD: f64 = 24.0;
pub const FOOD_LOW_THRESHOLD: f64 = 20.0;
pub const WATER_MAIN_LOW_THRESHOLD: f64 = 10.0;
pub const WATER_DRINKER_LOW_THRESHOLD: f64 = 5.0;

const HOPPER_CAPACITY_GRAMS: f64 = 5000.0;
const MAIN_TANK_ML: f64 = 20000.0;
const DRINKER_ML: f64 = 3000.0;

/// Below this the farmer is assumed to have refilled the container.
const RESTOCK_LEVEL: f64 = 2.0;

/// Fraction of the day elapsed, `0.0` at midnight.
pub fn day_fraction(seconds_since_midnight: u32) -> f64 {
    seconds_since_midnight as f64 / 86400.0
}

pub fn simulated_temperature(day_fraction: f64) -> f64 {
    // Coolest around 03:00, warmest around 15:00.
    let radians = (day_fraction - 0.375) * 2.0 * PI;

    26.0 + 8.0 * radians.sin()
}

pub fn simulated_humidity(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.375) * 2.0 * PI;

    60.0 - 15.0 * radians.sin()
}

/// Fan and heat lamp state chosen by the firmware's thermostat.
pub fn automation(temperature: f64) -> (bool, bool) {
    if temperature > TEMP_HIGH_THRESHOLD {
        (true, false)
    } else if temperature < TEMP_LOW_THRESHOLD {
        (false, true)
    } else {
        (false, false)
    }
}

/// Container levels in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Levels {
    pub food: f64,
    pub water_main: f64,
    pub water_drinker: f64,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            food: 100.0,
            water_main: 100.0,
            water_drinker: 100.0,
        }
    }
}

impl Levels {
    /// What the flock eats and drinks between two readings.
    pub fn consume(&mut self, food: f64, water: f64) {
        self.food = (self.food - food.max(0.0)).max(0.0);
        self.water_drinker = (self.water_drinker - water.max(0.0)).max(0.0);
    }

    /// Servo opens for `seconds`, moving feed out of the hopper.
    pub fn dispense_feed(&mut self, seconds: f64) {
        let grams = seconds / SERVO_SECONDS_PER_GRAM;
        self.food = (self.food - grams / HOPPER_CAPACITY_GRAMS * 100.0).max(0.0);
    }

    /// Pump moves `ml` from the main tank to the drinker.
    pub fn pump_water(&mut self, ml: f64) {
        let available = self.water_main / 100.0 * MAIN_TANK_ML;
        let room = (100.0 - self.water_drinker) / 100.0 * DRINKER_ML;
        let moved = ml.max(0.0).min(available).min(room);

        self.water_main -= moved / MAIN_TANK_ML * 100.0;
        self.water_drinker += moved / DRINKER_ML * 100.0;
    }

    /// Refills the hopper and the main tank once they run dry. Returns
    /// whether anything was refilled.
    pub fn restock(&mut self) -> bool {
        let mut restocked = false;

        if self.food < RESTOCK_LEVEL {
            self.food = 100.0;
            restocked = true;
        }
        if self.water_main < RESTOCK_LEVEL {
            self.water_main = 100.0;
            restocked = true;
        }

        restocked
    }
}

/// One simulated firmware reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub levels: Levels,
    pub alerts: AlertFlags,
    pub fan: bool,
    pub heat: bool,
    pub pump: bool,
    pub is_feeding: bool,
    pub is_water_filling: bool,
}

impl Reading {
    pub fn sensors(&self) -> Value {
        json!({
            "temperature": round1(self.temperature),
            "humidity": round1(self.humidity),
            "foodLevel": round1(self.levels.food),
            "waterLevelMain": round1(self.levels.water_main),
            "waterLevelDrinker": round1(self.levels.water_drinker),
            "timestamp": self.timestamp,
        })
    }

    pub fn alerts(&self) -> Value {
        json!({
            "highTemperature": self.alerts.high_temperature,
            "lowTemperature": self.alerts.low_temperature,
            "lowFood": self.alerts.low_food,
            "lowWaterMain": self.alerts.low_water_main,
            "lowWaterDrinker": self.alerts.low_water_drinker,
        })
    }

    /// Relay outputs are active-low, so pin levels are written inverted.
    pub fn device_states(&self) -> Value {
        json!({
            "fan": !self.fan,
            "heat": !self.heat,
            "pump": !self.pump,
            "isFeeding": self.is_feeding,
            "isWaterFilling": self.is_water_filling,
        })
    }

    pub fn history(&self) -> HistoryRecord {
        HistoryRecord {
            timestamp: self.timestamp,
            temperature: Some(round1(self.temperature)),
            humidity: Some(round1(self.humidity)),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Firmware state carried between readings.
#[derive(Debug, Default)]
pub struct Coop {
    pub levels: Levels,
    alerts: AlertFlags,
    feeding: bool,
    filling: bool,
}

impl Coop {
    /// Applies the dashboard's controls and produces the next reading.
    /// Dispenses once per rising edge of a trigger.
    pub fn advance(
        &mut self,
        timestamp: i64,
        temperature: f64,
        humidity: f64,
        controls: &ControlFlags,
        water: &WaterSettings,
    ) -> Reading {
        if controls.feed && !self.feeding {
            self.levels.dispense_feed(controls.feed_duration.unwrap_or(0.0));
        }
        if controls.water_fill && !self.filling {
            self.levels
                .pump_water(water.flow_rate * water.fill_duration as f64);
        }
        self.feeding = controls.feed;
        self.filling = controls.water_fill;

        let (fan, heat) = if controls.automation_enabled {
            automation(temperature)
        } else {
            (controls.fan, controls.heat)
        };

        self.alerts = AlertFlags {
            high_temperature: temperature > TEMP_HIGH_THRESHOLD,
            low_temperature: temperature < TEMP_LOW_THRESHOLD,
            low_food: self.levels.food < FOOD_LOW_THRESHOLD,
            low_water_main: self.levels.water_main < WATER_MAIN_LOW_THRESHOLD,
            low_water_drinker: self.levels.water_drinker < WATER_DRINKER_LOW_THRESHOLD,
            low_hydration: false,
        };

        Reading {
            timestamp,
            temperature,
            humidity,
            levels: self.levels,
            alerts: self.alerts.clone(),
            fan,
            heat,
            pump: controls.pump || controls.water_fill,
            is_feeding: controls.feed,
            is_water_filling: controls.water_fill,
        }
    }

    /// Alert kinds that were off in `before` and are on now.
    pub fn raised_alerts(before: &AlertFlags, after: &AlertFlags) -> Vec<EventKind> {
        [
            (before.high_temperature, after.high_temperature, EventKind::HighTemperature),
            (before.low_temperature, after.low_temperature, EventKind::LowTemperature),
            (before.low_food, after.low_food, EventKind::LowFood),
            (before.low_water_main, after.low_water_main, EventKind::LowWaterMain),
            (before.low_water_drinker, after.low_water_drinker, EventKind::LowWaterDrinker),
        ]
        .into_iter()
        .filter(|(was, is, _)| !was && *is)
        .map(|(_, _, kind)| kind)
        .collect()
    }

    pub fn alert_flags(&self) -> &AlertFlags {
        &self.alerts
    }
}

/// Noise around the daily curves and the flock's consumption per reading.
pub struct Noise {
    temperature: Normal<f64>,
    humidity: Normal<f64>,
    food: Normal<f64>,
    water: Normal<f64>,
}

impl Noise {
    pub fn new(interval_secs: u64) -> Result<Self, rand_distr::NormalError> {
        // Roughly a full hopper per two days and a drinker per half day.
        let hours = interval_secs as f64 / 3600.0;

        Ok(Self {
            temperature: Normal::new(0.0, 0.3)?,
            humidity: Normal::new(0.0, 1.0)?,
            food: Normal::new(2.0 * hours, 0.5 * hours)?,
            water: Normal::new(8.0 * hours, 2.0 * hours)?,
        })
    }

    pub fn temperature<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.temperature.sample(rng)
    }

    pub fn humidity<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.humidity.sample(rng)
    }

    pub fn consumption<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        (self.food.sample(rng), self.water.sample(rng))
    }
}

pub fn sample_feeding_log<R: Rng + ?Sized>(rng: &mut R, timestamp: i64) -> FeedingLog {
    let grams = rng.random_range(500..1000) as f64;
    let age_group = match rng.random_range(0..3) {
        0 => AgeGroup::Chick,
        1 => AgeGroup::Grower,
        _ => AgeGroup::Adult,
    };

    FeedingLog {
        timestamp,
        grams_dispensed: grams,
        age_group,
        chicken_count: rng.random_range(5..25),
        servo_open_time: servo_open_time(grams),
        feed_type: FeedType::Recommended,
    }
}

pub fn sample_water_log<R: Rng + ?Sized>(rng: &mut R, timestamp: i64, flow_rate: f64) -> WaterLog {
    let ml = rng.random_range(500..1500) as f64;

    WaterLog {
        timestamp,
        volume_dispensed: ml,
        duration_seconds: ml / flow_rate,
        flow_rate,
    }
}

pub fn sample_history<R: Rng + ?Sized>(rng: &mut R, timestamp: i64) -> HistoryRecord {
    HistoryRecord {
        timestamp,
        temperature: Some(round1(rng.random_range(20.0..35.0))),
        humidity: Some(round1(rng.random_range(40.0..80.0))),
    }
}
