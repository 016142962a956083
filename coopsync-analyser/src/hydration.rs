use coopsync_api::models::HydrationStatus;
use time::OffsetDateTime;

use crate::calendar::Calendar;
use crate::sample::Sample;

/// Below this many ml per bird per day the flock is under-watered.
pub const HYDRATION_WARNING_ML: f64 = 180.0;
pub const HYDRATION_ALERT_ML: f64 = 120.0;

pub fn classify_hydration(per_bird: f64) -> HydrationStatus {
    if per_bird < HYDRATION_ALERT_ML {
        HydrationStatus::Alert
    } else if per_bird < HYDRATION_WARNING_ML {
        HydrationStatus::Warning
    } else {
        HydrationStatus::Normal
    }
}

pub fn water_per_bird(total: f64, chicken_count: u32) -> f64 {
    if chicken_count == 0 {
        0.0
    } else {
        total / chicken_count as f64
    }
}

/// Sum of samples since local midnight.
pub fn total_today(samples: &[Sample], now: OffsetDateTime, calendar: &Calendar) -> f64 {
    let start = calendar.start_of_day(calendar.today(now));

    samples
        .iter()
        .filter(|sample| sample.is_valid() && sample.timestamp >= start)
        .map(|sample| sample.value)
        .sum()
}
