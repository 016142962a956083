//! Key paths of the realtime store shared with the coop firmware.

pub const SENSORS: &str = "/sensors";
pub const ALERTS: &str = "/alerts";
pub const CONTROLS: &str = "/controls";
pub const DEVICE_STATES: &str = "/deviceStates";

pub const CONTROL_FAN: &str = "/controls/fan";
pub const CONTROL_HEAT: &str = "/controls/heat";
pub const CONTROL_PUMP: &str = "/controls/pump";
pub const CONTROL_AUTOMATION: &str = "/controls/automationEnabled";
pub const CONTROL_FEED: &str = "/controls/feed";
pub const CONTROL_FEED_DURATION: &str = "/controls/feedDuration";
pub const CONTROL_WATER_FILL: &str = "/controls/waterFill";

pub const DEVICE_IS_FEEDING: &str = "/deviceStates/isFeeding";
pub const DEVICE_IS_WATER_FILLING: &str = "/deviceStates/isWaterFilling";

pub const FEEDING_LOGS: &str = "/feedingLogs";
pub const WATER_LOGS: &str = "/waterLogs";
pub const HISTORY: &str = "/history";
pub const EVENTS: &str = "/events";

pub const FEEDING_SCHEDULE: &str = "/feedingSchedule";
pub const WATER_SCHEDULE: &str = "/waterSchedule";

pub const FEEDING_SETTINGS: &str = "/feedingSettings";
pub const WATER_SETTINGS: &str = "/waterSettings";
pub const WATER_FLOW_RATE: &str = "/waterSettings/flowRate";
pub const WATER_FILL_DURATION: &str = "/waterSettings/fillDuration";

pub const CAMERA_IP: &str = "/settings/cameraIP";

/// Joins a child key onto a parent path.
pub fn child(parent: &str, key: impl core::fmt::Display) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), key)
}
