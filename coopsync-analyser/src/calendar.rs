use time::{Date, Duration, Month, OffsetDateTime, UtcOffset, Weekday};

use crate::AnalyserError;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Local-time rules used to cut instants into days, weeks and months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: UtcOffset,
    week_start: Weekday,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            offset: UtcOffset::UTC,
            week_start: Weekday::Sunday,
        }
    }
}

impl Calendar {
    pub fn new(offset: UtcOffset, week_start: Weekday) -> Self {
        Self { offset, week_start }
    }

    pub fn from_offset_minutes(minutes: i32, week_start: Weekday) -> Result<Self, AnalyserError> {
        let offset = UtcOffset::from_whole_seconds(minutes.saturating_mul(60))?;

        Ok(Self::new(offset, week_start))
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Local date and time of an epoch-seconds timestamp.
    pub fn local(&self, timestamp: i64) -> Result<OffsetDateTime, AnalyserError> {
        OffsetDateTime::from_unix_timestamp(timestamp)
            .map(|instant| instant.to_offset(self.offset))
            .map_err(|_| AnalyserError::TimestampOutOfRange(timestamp))
    }

    pub fn today(&self, now: OffsetDateTime) -> Date {
        now.to_offset(self.offset).date()
    }

    /// Epoch seconds of local midnight starting `date`.
    pub fn start_of_day(&self, date: Date) -> i64 {
        date.midnight().assume_offset(self.offset).unix_timestamp()
    }

    /// First day of the week containing `date`.
    pub fn start_of_week(&self, date: Date) -> Date {
        let back = (7 + date.weekday().number_days_from_sunday()
            - self.week_start.number_days_from_sunday())
            % 7;

        date - Duration::days(back as i64)
    }
}

pub fn days_in_month(date: Date) -> u8 {
    date.month().length(date.year())
}

pub fn start_of_month(date: Date) -> Result<Date, AnalyserError> {
    Ok(date.replace_day(1)?)
}

pub fn start_of_previous_month(date: Date) -> Result<Date, AnalyserError> {
    let (year, month) = match date.month() {
        Month::January => (date.year() - 1, Month::December),
        month => (date.year(), month.previous()),
    };

    Ok(Date::from_calendar_date(year, month, 1)?)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn test_start_of_day_with_offset() {
        let calendar = Calendar::from_offset_minutes(120, Weekday::Sunday).unwrap();

        // 2024-03-15 00:00 at +02:00 is 2024-03-14 22:00 UTC
        assert_eq!(
            calendar.start_of_day(date!(2024 - 03 - 15)),
            datetime!(2024-03-14 22:00 UTC).unix_timestamp()
        );
        assert_eq!(
            calendar.today(datetime!(2024-03-14 23:30 UTC)),
            date!(2024 - 03 - 15)
        );
    }

    #[test]
    fn test_start_of_week() {
        let sunday = Calendar::default();
        let monday = Calendar::new(UtcOffset::UTC, Weekday::Monday);

        // 2024-03-15 is a Friday
        assert_eq!(sunday.start_of_week(date!(2024 - 03 - 15)), date!(2024 - 03 - 10));
        assert_eq!(monday.start_of_week(date!(2024 - 03 - 15)), date!(2024 - 03 - 11));
        assert_eq!(sunday.start_of_week(date!(2024 - 03 - 10)), date!(2024 - 03 - 10));
        assert_eq!(monday.start_of_week(date!(2024 - 03 - 10)), date!(2024 - 03 - 04));
    }

    #[test]
    fn test_month_helpers() {
        assert_eq!(days_in_month(date!(2024 - 02 - 10)), 29);
        assert_eq!(days_in_month(date!(2023 - 02 - 10)), 28);
        assert_eq!(days_in_month(date!(2024 - 04 - 30)), 30);
        assert_eq!(days_in_month(date!(2024 - 12 - 01)), 31);
        assert_eq!(
            start_of_previous_month(date!(2024 - 01 - 20)).unwrap(),
            date!(2023 - 12 - 01)
        );
        assert_eq!(start_of_month(date!(2024 - 03 - 31)).unwrap(), date!(2024 - 03 - 01));
    }
}
