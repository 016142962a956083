use serde::{Deserialize, Serialize};

use super::AgeGroup;
use crate::paths;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actuator {
    Fan,
    Heat,
    Pump,
    Automation,
}

impl Actuator {
    pub fn path(&self) -> &'static str {
        match self {
            Actuator::Fan => paths::CONTROL_FAN,
            Actuator::Heat => paths::CONTROL_HEAT,
            Actuator::Pump => paths::CONTROL_PUMP,
            Actuator::Automation => paths::CONTROL_AUTOMATION,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    pub enabled: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    pub actuator: Actuator,
    pub enabled: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FeedRequest {
    /// Custom amount in grams; the recommended amount is used when absent
    pub grams: Option<f64>,
    /// Overrides the stored age group
    pub age_group: Option<AgeGroup>,
    /// Overrides the stored flock size
    pub chicken_count: Option<u32>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterRequest {
    /// Volume to dispense in ml
    pub ml: f64,
    /// Overrides the stored pump flow rate in ml per second
    pub flow_rate: Option<f64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispenseResponse {
    pub message: String,
    /// Grams or ml dispensed
    pub amount: f64,
    /// Servo or pump run time in seconds
    pub duration_seconds: f64,
    /// Seconds until the trigger flag is cleared
    pub reset_after_seconds: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenseStatus {
    pub feeding: bool,
    pub watering: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Feeding,
    Water,
}

impl ScheduleKind {
    pub fn path(&self) -> &'static str {
        match self {
            ScheduleKind::Feeding => paths::FEEDING_SCHEDULE,
            ScheduleKind::Water => paths::WATER_SCHEDULE,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Hour of day, 0 to 23
    pub hour: u8,
    pub enabled: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub kind: ScheduleKind,
    pub slots: Vec<ScheduleSlot>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub enabled: bool,
}
