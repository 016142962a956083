use coopsync_api::models::Period;
use time::{Date, OffsetDateTime};

use crate::calendar::{days_in_month, start_of_previous_month, Calendar, SECONDS_PER_DAY};
use crate::sample::{clean_samples, Sample};
use crate::window::{PeriodWindow, PeriodWindows};
use crate::AnalyserError;

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub current: f64,
    /// `None` when not comparing, or when the comparison period has no
    /// bucket at this index (day 31 against a 30-day month).
    pub previous: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: f64,
    pub average_per_day: f64,
    /// Hour of day with the largest all-time sum, earliest hour on ties
    pub peak_hour: Option<u8>,
}

impl Summary {
    pub fn peak_hour_label(&self) -> Option<String> {
        self.peak_hour
            .map(|hour| format!("{:02}:00 - {:02}:00", hour, hour + 1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub windows: PeriodWindows,
    pub compare: bool,
    pub points: Vec<SeriesPoint>,
    /// Sum of every comparison bucket when comparing. A previous month
    /// longer than the current one still counts its trailing days here.
    pub previous_total: Option<f64>,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Analytics {
    NoData,
    Report(Report),
}

/// Buckets `samples` into chart points for `period` and computes the
/// all-time summary.
///
/// Points come out in calendar order; they are never re-sorted by value.
pub fn aggregate(
    samples: &[Sample],
    period: Period,
    compare: bool,
    now: OffsetDateTime,
    calendar: &Calendar,
) -> Result<Analytics, AnalyserError> {
    let samples = clean_samples(samples);

    let Some(summary) = summarize(&samples, now, calendar)? else {
        return Ok(Analytics::NoData);
    };

    let windows = PeriodWindows::for_period(period, now, calendar)?;
    let today = calendar.today(now);

    let labels = labels(period, today);
    let current = bucket_sums(&samples, &windows.current, period, labels.len(), calendar)?;
    let previous = if compare {
        let slots = comparison_slots(period, today)?;
        Some(bucket_sums(&samples, &windows.comparison, period, slots, calendar)?)
    } else {
        None
    };

    let previous_total = previous.as_ref().map(|sums| sums.iter().sum());

    let points = labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| SeriesPoint {
            label,
            current: current[index],
            previous: previous.as_ref().and_then(|sums| sums.get(index).copied()),
        })
        .collect();

    Ok(Analytics::Report(Report {
        windows,
        compare,
        points,
        previous_total,
        summary,
    }))
}

/// Total, per-day average and peak hour over every sample.
///
/// Returns `None` when there is nothing to summarise.
pub fn summarize(
    samples: &[Sample],
    now: OffsetDateTime,
    calendar: &Calendar,
) -> Result<Option<Summary>, AnalyserError> {
    let Some(earliest) = samples.iter().map(|sample| sample.timestamp).min() else {
        return Ok(None);
    };

    let total: f64 = samples.iter().map(|sample| sample.value).sum();

    let first_day = calendar.start_of_day(calendar.local(earliest)?.date());
    let end_of_today = calendar.start_of_day(calendar.today(now)) + SECONDS_PER_DAY;
    let span = end_of_today - first_day;
    let days = ((span + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY).max(1);

    let mut hourly = [0.0_f64; 24];
    for sample in samples {
        hourly[calendar.local(sample.timestamp)?.hour() as usize] += sample.value;
    }

    let mut peak_hour = None;
    let mut peak_value = 0.0;
    for (hour, value) in hourly.iter().enumerate() {
        if *value > peak_value {
            peak_value = *value;
            peak_hour = Some(hour as u8);
        }
    }

    Ok(Some(Summary {
        total,
        average_per_day: total / days as f64,
        peak_hour,
    }))
}

fn labels(period: Period, today: Date) -> Vec<String> {
    match period {
        Period::Day => (0..24).map(|hour| format!("{hour:02}:00")).collect(),
        Period::Week => WEEKDAY_LABELS.iter().map(|label| label.to_string()).collect(),
        Period::Month => (1..=days_in_month(today)).map(|day| day.to_string()).collect(),
    }
}

fn comparison_slots(period: Period, today: Date) -> Result<usize, AnalyserError> {
    Ok(match period {
        Period::Day => 24,
        Period::Week => 7,
        Period::Month => days_in_month(start_of_previous_month(today)?) as usize,
    })
}

fn bucket_sums(
    samples: &[Sample],
    window: &PeriodWindow,
    period: Period,
    slots: usize,
    calendar: &Calendar,
) -> Result<Vec<f64>, AnalyserError> {
    let mut sums = vec![0.0; slots];

    for sample in samples.iter().filter(|sample| window.contains(sample.timestamp)) {
        let local = calendar.local(sample.timestamp)?;
        let index = match period {
            Period::Day => local.hour() as usize,
            Period::Week => local.weekday().number_days_from_sunday() as usize,
            Period::Month => local.day() as usize - 1,
        };

        if let Some(sum) = sums.get_mut(index) {
            *sum += sample.value;
        }
    }

    Ok(sums)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn sample(at: OffsetDateTime, value: f64) -> Sample {
        Sample {
            timestamp: at.unix_timestamp(),
            value,
        }
    }

    fn report(analytics: Analytics) -> Report {
        match analytics {
            Analytics::Report(report) => report,
            Analytics::NoData => panic!("expected a report"),
        }
    }

    #[test]
    fn test_empty_input_is_no_data() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let calendar = Calendar::default();

        assert_eq!(
            aggregate(&[], Period::Day, true, now, &calendar).unwrap(),
            Analytics::NoData
        );

        let invalid = [Sample { timestamp: 0, value: 10.0 }, Sample { timestamp: 5, value: -1.0 }];
        assert_eq!(
            aggregate(&invalid, Period::Week, false, now, &calendar).unwrap(),
            Analytics::NoData
        );
    }

    #[test]
    fn test_day_buckets_and_comparison() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-03-15 07:10 UTC), 100.0),
            sample(datetime!(2024-03-15 07:50 UTC), 50.0),
            sample(datetime!(2024-03-15 11:59 UTC), 25.0),
            sample(datetime!(2024-03-14 07:30 UTC), 80.0),
            sample(datetime!(2024-03-13 07:30 UTC), 999.0),
        ];

        let report = report(aggregate(&samples, Period::Day, true, now, &Calendar::default()).unwrap());

        assert_eq!(report.points.len(), 24);
        assert_eq!(report.points[0].label, "00:00");
        assert_eq!(report.points[7].label, "07:00");
        assert_eq!(report.points[7].current, 150.0);
        assert_eq!(report.points[7].previous, Some(80.0));
        assert_eq!(report.points[11].current, 25.0);
        assert_eq!(report.points[3].previous, Some(0.0));
    }

    #[test]
    fn test_no_comparison_leaves_previous_empty() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let samples = vec![sample(datetime!(2024-03-15 08:00 UTC), 10.0)];

        let report = report(aggregate(&samples, Period::Week, false, now, &Calendar::default()).unwrap());

        assert!(report.points.iter().all(|point| point.previous.is_none()));
        assert_eq!(
            report.points.iter().map(|point| point.label.as_str()).collect::<Vec<_>>(),
            vec!["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        assert_eq!(report.points[5].current, 10.0);
    }

    #[test]
    fn test_bucket_sum_equals_window_sum() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-03-10 00:00 UTC), 1.0),
            sample(datetime!(2024-03-12 13:00 UTC), 2.5),
            sample(datetime!(2024-03-15 11:00 UTC), 4.0),
            sample(datetime!(2024-03-09 23:59:59 UTC), 8.0),
            sample(datetime!(2024-03-03 00:00 UTC), 16.0),
        ];

        let report = report(aggregate(&samples, Period::Week, true, now, &Calendar::default()).unwrap());

        let current: f64 = report.points.iter().map(|point| point.current).sum();
        let previous: f64 = report.points.iter().filter_map(|point| point.previous).sum();

        assert_eq!(current, 7.5);
        assert_eq!(previous, 24.0);
    }

    #[test]
    fn test_month_comparison_marks_missing_days() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-03-31 12:00 UTC), 1.0),
            sample(datetime!(2024-02-29 12:00 UTC), 3.0),
            sample(datetime!(2024-03-02 12:00 UTC), 5.0),
        ];

        let report = report(aggregate(&samples, Period::Month, true, now, &Calendar::default()).unwrap());

        assert_eq!(report.points.len(), 31);
        assert_eq!(report.points[0].label, "1");
        assert_eq!(report.points[1].current, 5.0);
        assert_eq!(report.points[28].previous, Some(3.0));
        assert_eq!(report.points[29].previous, None);
        assert_eq!(report.points[30].previous, None);
        // After now, outside the current window
        assert_eq!(report.points[30].current, 0.0);
    }

    #[test]
    fn test_month_comparison_against_thirty_day_month() {
        let now = datetime!(2024-05-20 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-04-30 08:00 UTC), 4.0),
            sample(datetime!(2024-05-01 08:00 UTC), 2.0),
        ];

        let report = report(aggregate(&samples, Period::Month, true, now, &Calendar::default()).unwrap());

        assert_eq!(report.points.len(), 31);
        assert_eq!(report.points[0].current, 2.0);
        assert_eq!(report.points[0].previous, Some(0.0));
        assert_eq!(report.points[29].previous, Some(4.0));
        assert_eq!(report.points[30].previous, None);
        assert_eq!(report.previous_total, Some(4.0));
    }

    #[test]
    fn test_month_comparison_against_non_leap_february() {
        let now = datetime!(2023-03-10 12:00 UTC);
        let samples = vec![
            sample(datetime!(2023-02-28 08:00 UTC), 6.0),
            sample(datetime!(2023-03-01 08:00 UTC), 1.0),
        ];

        let report = report(aggregate(&samples, Period::Month, true, now, &Calendar::default()).unwrap());

        assert_eq!(report.points.len(), 31);
        assert_eq!(report.points[27].previous, Some(6.0));
        for day in 28..31 {
            assert_eq!(report.points[day].previous, None);
            assert_eq!(report.points[day].current, 0.0);
        }
    }

    #[test]
    fn test_month_comparison_against_longer_month() {
        let now = datetime!(2024-04-10 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-03-30 08:00 UTC), 3.0),
            sample(datetime!(2024-03-31 08:00 UTC), 7.0),
            sample(datetime!(2024-04-02 08:00 UTC), 1.0),
        ];

        let report = report(aggregate(&samples, Period::Month, true, now, &Calendar::default()).unwrap());

        assert_eq!(report.points.len(), 30);
        assert_eq!(report.points[29].label, "30");
        assert_eq!(report.points[29].previous, Some(3.0));
        assert!(report.points.iter().all(|point| point.previous.is_some()));
        // March 31 has no point of its own but still counts.
        assert_eq!(report.previous_total, Some(10.0));
    }

    #[test]
    fn test_previous_total_only_when_comparing() {
        let now = datetime!(2024-04-10 12:00 UTC);
        let samples = vec![sample(datetime!(2024-03-31 08:00 UTC), 7.0)];

        let report = report(aggregate(&samples, Period::Month, false, now, &Calendar::default()).unwrap());

        assert_eq!(report.previous_total, None);
    }

    #[test]
    fn test_summary_average_and_peak() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-03-13 06:00 UTC), 30.0),
            sample(datetime!(2024-03-14 09:00 UTC), 30.0),
            sample(datetime!(2024-03-15 06:30 UTC), 30.0),
        ];

        let summary = summarize(&samples, now, &Calendar::default()).unwrap().unwrap();

        assert_eq!(summary.total, 90.0);
        assert_eq!(summary.average_per_day, 30.0);
        assert_eq!(summary.peak_hour, Some(6));
        assert_eq!(summary.peak_hour_label().as_deref(), Some("06:00 - 07:00"));
    }

    #[test]
    fn test_peak_hour_tie_goes_to_earliest() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let samples = vec![
            sample(datetime!(2024-03-15 09:00 UTC), 10.0),
            sample(datetime!(2024-03-15 03:00 UTC), 10.0),
        ];

        let summary = summarize(&samples, now, &Calendar::default()).unwrap().unwrap();

        assert_eq!(summary.peak_hour, Some(3));
        assert_eq!(summary.average_per_day, 20.0);
    }

    #[test]
    fn test_local_offset_moves_buckets() {
        let now = datetime!(2024-03-15 12:00 UTC);
        let calendar = Calendar::from_offset_minutes(180, time::Weekday::Sunday).unwrap();
        let samples = vec![sample(datetime!(2024-03-15 05:00 UTC), 10.0)];

        let report = report(aggregate(&samples, Period::Day, false, now, &calendar).unwrap());

        assert_eq!(report.points[8].current, 10.0);
    }
}
