use coopsync_api::models::Period;
use time::OffsetDateTime;

use crate::calendar::{start_of_month, start_of_previous_month, Calendar, SECONDS_PER_DAY};
use crate::AnalyserError;

/// Inclusive range of epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: i64,
    pub end: i64,
}

impl PeriodWindow {
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindows {
    pub period: Period,
    /// From the start of the running period up to now
    pub current: PeriodWindow,
    /// The whole period right before `current`
    pub comparison: PeriodWindow,
}

impl PeriodWindows {
    pub fn for_period(
        period: Period,
        now: OffsetDateTime,
        calendar: &Calendar,
    ) -> Result<Self, AnalyserError> {
        let now_ts = now.unix_timestamp();
        let today = calendar.today(now);

        let (current_start, comparison_start) = match period {
            Period::Day => {
                let start = calendar.start_of_day(today);
                (start, start - SECONDS_PER_DAY)
            }
            Period::Week => {
                let start = calendar.start_of_day(calendar.start_of_week(today));
                (start, start - 7 * SECONDS_PER_DAY)
            }
            Period::Month => (
                calendar.start_of_day(start_of_month(today)?),
                calendar.start_of_day(start_of_previous_month(today)?),
            ),
        };

        Ok(Self {
            period,
            current: PeriodWindow {
                start: current_start,
                end: now_ts.max(current_start),
            },
            comparison: PeriodWindow {
                start: comparison_start,
                end: current_start - 1,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::{UtcOffset, Weekday};

    use super::*;

    fn check_invariants(windows: &PeriodWindows) {
        assert!(windows.current.start <= windows.current.end);
        assert!(windows.comparison.start <= windows.comparison.end);
        assert_eq!(windows.comparison.end, windows.current.start - 1);
    }

    #[test]
    fn test_day_windows() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let windows = PeriodWindows::for_period(Period::Day, now, &Calendar::default()).unwrap();

        assert_eq!(windows.current.start, datetime!(2024-03-15 00:00 UTC).unix_timestamp());
        assert_eq!(windows.current.end, now.unix_timestamp());
        assert_eq!(windows.comparison.start, datetime!(2024-03-14 00:00 UTC).unix_timestamp());
        check_invariants(&windows);
    }

    #[test]
    fn test_week_windows_follow_week_start() {
        let now = datetime!(2024-03-15 12:00 UTC);

        let sunday = PeriodWindows::for_period(Period::Week, now, &Calendar::default()).unwrap();
        assert_eq!(sunday.current.start, datetime!(2024-03-10 00:00 UTC).unix_timestamp());
        assert_eq!(sunday.comparison.start, datetime!(2024-03-03 00:00 UTC).unix_timestamp());
        check_invariants(&sunday);

        let calendar = Calendar::new(UtcOffset::UTC, Weekday::Monday);
        let monday = PeriodWindows::for_period(Period::Week, now, &calendar).unwrap();
        assert_eq!(monday.current.start, datetime!(2024-03-11 00:00 UTC).unix_timestamp());
        check_invariants(&monday);
    }

    #[test]
    fn test_month_windows_cover_whole_previous_month() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let windows = PeriodWindows::for_period(Period::Month, now, &Calendar::default()).unwrap();

        assert_eq!(windows.current.start, datetime!(2024-03-01 00:00 UTC).unix_timestamp());
        assert_eq!(windows.comparison.start, datetime!(2024-02-01 00:00 UTC).unix_timestamp());
        assert_eq!(windows.comparison.end, datetime!(2024-02-29 23:59:59 UTC).unix_timestamp());
        check_invariants(&windows);
    }

    #[test]
    fn test_windows_at_midnight() {
        let now = datetime!(2024-01-01 00:00 UTC);

        for period in [Period::Day, Period::Week, Period::Month] {
            let windows = PeriodWindows::for_period(period, now, &Calendar::default()).unwrap();
            check_invariants(&windows);
        }
    }
}
