use coopsync_api::models::Period;
use coopsync_api::parse::{number_field, timestamp_field};
use serde_json::Value;
use time::OffsetDateTime;

use crate::calendar::{Calendar, SECONDS_PER_DAY};
use crate::sample::children;

/// One temperature/humidity reading from `/history`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl Reading {
    pub fn from_record(record: &Value) -> Option<Self> {
        let timestamp = timestamp_field(record, "timestamp").filter(|ts| *ts > 0)?;
        let temperature = number_field(record, "temperature");
        let humidity = number_field(record, "humidity");

        if temperature.is_none() && humidity.is_none() {
            return None;
        }

        Some(Self {
            timestamp,
            temperature,
            humidity,
        })
    }
}

/// Valid readings of a `/history` node, oldest first.
pub fn clean_readings(collection: &Value) -> Vec<Reading> {
    let mut readings: Vec<Reading> = children(collection)
        .into_iter()
        .filter_map(|(_, record)| Reading::from_record(record))
        .collect();

    readings.sort_by_key(|reading| reading.timestamp);
    readings
}

pub fn points_per_page(period: Period) -> usize {
    match period {
        Period::Day => 24,
        Period::Week => 24 * 7,
        Period::Month => 24 * 30,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// Zero-based
    pub page: usize,
    pub total_pages: usize,
    pub points_per_page: usize,
    pub readings: Vec<Reading>,
}

/// Selects one page of readings for `period`.
///
/// Week and month fall back to every reading when the period itself is
/// empty; an empty day has no data. Without an explicit page the most
/// recent one is returned.
pub fn history_page(
    readings: &[Reading],
    period: Period,
    page: Option<usize>,
    now: OffsetDateTime,
    calendar: &Calendar,
) -> Option<HistoryPage> {
    let now_ts = now.unix_timestamp();
    let cutoff = match period {
        Period::Day => calendar.start_of_day(calendar.today(now)),
        Period::Week => now_ts - 7 * SECONDS_PER_DAY,
        Period::Month => now_ts - 30 * SECONDS_PER_DAY,
    };

    let mut selected: Vec<Reading> = readings
        .iter()
        .copied()
        .filter(|reading| reading.timestamp >= cutoff)
        .collect();

    if selected.is_empty() {
        if period == Period::Day {
            return None;
        }
        selected = readings.to_vec();
    }

    if selected.is_empty() {
        return None;
    }

    let per_page = points_per_page(period);
    let total_pages = selected.len().div_ceil(per_page);
    let page = page.unwrap_or(total_pages - 1).min(total_pages - 1);

    let start = page * per_page;
    let end = (start + per_page).min(selected.len());

    Some(HistoryPage {
        page,
        total_pages,
        points_per_page: per_page,
        readings: selected[start..end].to_vec(),
    })
}
