use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    /// Since local midnight
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    #[default]
    All,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Alert,
    Info,
}

/// Known values of the `type` field of an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    HighTemperature,
    LowTemperature,
    LowFood,
    LowWaterMain,
    LowWaterDrinker,
    LowHydration,
    Feeding,
    Watering,
    Other,
}

impl EventKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "highTemperature" => EventKind::HighTemperature,
            "lowTemperature" => EventKind::LowTemperature,
            "lowFood" => EventKind::LowFood,
            "lowWaterMain" => EventKind::LowWaterMain,
            "lowWaterDrinker" => EventKind::LowWaterDrinker,
            "lowHydration" => EventKind::LowHydration,
            "feeding" => EventKind::Feeding,
            "watering" => EventKind::Watering,
            _ => EventKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::HighTemperature => "highTemperature",
            EventKind::LowTemperature => "lowTemperature",
            EventKind::LowFood => "lowFood",
            EventKind::LowWaterMain => "lowWaterMain",
            EventKind::LowWaterDrinker => "lowWaterDrinker",
            EventKind::LowHydration => "lowHydration",
            EventKind::Feeding => "feeding",
            EventKind::Watering => "watering",
            EventKind::Other => "other",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            EventKind::Feeding | EventKind::Watering | EventKind::Other => Severity::Info,
            _ => Severity::Alert,
        }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            EventKind::HighTemperature => "Temperature exceeded safe threshold",
            EventKind::LowTemperature => "Temperature below safe threshold",
            EventKind::LowFood => "Food level is low",
            EventKind::LowWaterMain => "Main water tank level is low",
            EventKind::LowWaterDrinker => "Drinker water level is low",
            EventKind::LowHydration => "Water intake per bird is low",
            EventKind::Feeding => "Automatic feeding activated",
            EventKind::Watering => "Water refill activated",
            EventKind::Other => "System event",
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Store key of the record
    pub id: String,
    pub timestamp: i64,
    /// Raw `type` field
    pub kind: String,
    pub description: String,
    pub severity: Severity,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListResponse {
    pub filter: EventFilter,
    /// Events matching the filter
    pub total: usize,
    /// Events not included because the list is collapsed
    pub hidden: usize,
    pub show_all: bool,
    pub events: Vec<EventEntry>,
}
