use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AgeGroup;
use crate::parse::{flag_field, number_field, text_field, timestamp_field};

pub const DEFAULT_FLOW_RATE: f64 = 100.0;
pub const DEFAULT_FILL_DURATION: u32 = 30;

/// Contents of `/feedingSettings`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingSettings {
    #[serde(default)]
    pub age_group: AgeGroup,
    #[serde(default = "default_chicken_count")]
    pub chicken_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_feed_time: Option<i64>,
}

fn default_chicken_count() -> u32 {
    1
}

impl Default for FeedingSettings {
    fn default() -> Self {
        Self {
            age_group: AgeGroup::default(),
            chicken_count: default_chicken_count(),
            last_feed_time: None,
        }
    }
}

impl FeedingSettings {
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();

        Self {
            age_group: text_field(value, "ageGroup")
                .and_then(AgeGroup::parse)
                .unwrap_or(defaults.age_group),
            chicken_count: number_field(value, "chickenCount")
                .filter(|count| *count >= 0.0)
                .map(|count| count as u32)
                .unwrap_or(defaults.chicken_count),
            last_feed_time: timestamp_field(value, "lastFeedTime"),
        }
    }
}

/// Contents of `/waterSettings`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterSettings {
    /// Pump flow rate in ml per second
    #[serde(default = "default_flow_rate")]
    pub flow_rate: f64,
    /// Automatic fill duration in whole seconds
    #[serde(default = "default_fill_duration")]
    pub fill_duration: u32,
    #[serde(default = "default_auto_enabled")]
    pub auto_enabled: bool,
}

fn default_flow_rate() -> f64 {
    DEFAULT_FLOW_RATE
}

fn default_fill_duration() -> u32 {
    DEFAULT_FILL_DURATION
}

fn default_auto_enabled() -> bool {
    true
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            flow_rate: DEFAULT_FLOW_RATE,
            fill_duration: DEFAULT_FILL_DURATION,
            auto_enabled: true,
        }
    }
}

impl WaterSettings {
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();

        Self {
            flow_rate: number_field(value, "flowRate")
                .filter(|rate| *rate > 0.0)
                .unwrap_or(defaults.flow_rate),
            fill_duration: number_field(value, "fillDuration")
                .filter(|duration| *duration >= 0.0)
                .map(|duration| duration.ceil() as u32)
                .unwrap_or(defaults.fill_duration),
            auto_enabled: flag_field(value, "autoEnabled").unwrap_or(defaults.auto_enabled),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
}
