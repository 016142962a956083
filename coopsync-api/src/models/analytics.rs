use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl core::fmt::Display for Period {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
        }
    }
}

/// Log collection an analytics chart is built from.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Feeding,
    Water,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Ready,
    NoData,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub current: f64,
    /// Comparison bucket; absent when not comparing or when the previous
    /// period has no such bucket
    pub previous: Option<f64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Sum over every valid record
    pub total: f64,
    pub average_per_day: f64,
    /// Busiest hour of day, e.g. `"07:00 - 08:00"`
    pub peak_hour: Option<String>,
    /// Sum over the whole comparison period, including days the current
    /// month has no point for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_total: Option<f64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub source: LogSource,
    pub period: Period,
    pub compare: bool,
    pub status: DataStatus,
    pub points: Vec<ChartPoint>,
    pub summary: Option<AnalyticsSummary>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub period: Period,
    pub status: DataStatus,
    /// Zero-based page index
    pub page: usize,
    pub total_pages: usize,
    pub points_per_page: usize,
    pub points: Vec<HistoryPoint>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationStatus {
    Normal,
    Warning,
    Alert,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationResponse {
    /// Water dispensed since local midnight in ml
    pub total_today: f64,
    pub chicken_count: u32,
    pub per_bird: f64,
    pub status: HydrationStatus,
}
