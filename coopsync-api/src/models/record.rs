use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Chick,
    Grower,
    #[default]
    Adult,
}

impl AgeGroup {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chick" => Some(AgeGroup::Chick),
            "grower" => Some(AgeGroup::Grower),
            "adult" => Some(AgeGroup::Adult),
            _ => None,
        }
    }
}

impl core::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            AgeGroup::Chick => write!(f, "chick"),
            AgeGroup::Grower => write!(f, "grower"),
            AgeGroup::Adult => write!(f, "adult"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    /// Amount derived from age group and flock size
    Recommended,
    /// Amount entered by the operator
    Custom,
}

impl core::fmt::Display for FeedType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            FeedType::Recommended => write!(f, "recommended"),
            FeedType::Custom => write!(f, "custom"),
        }
    }
}

/// Row under `/feedingLogs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedingLog {
    pub timestamp: i64,
    pub grams_dispensed: f64,
    pub age_group: AgeGroup,
    pub chicken_count: u32,
    pub servo_open_time: f64,
    pub feed_type: FeedType,
}

/// Row under `/waterLogs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterLog {
    pub timestamp: i64,
    pub volume_dispensed: f64,
    pub duration_seconds: f64,
    pub flow_rate: f64,
}

/// Row under `/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// Row under `/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
