use std::sync::Arc;

use coopsync_analyser::{
    Analytics, Calendar, Sample, aggregate, classify_hydration, clean_collection, clean_readings,
    history_page, points_per_page, total_today, water_per_bird,
};
use coopsync_api::models::{
    AnalyticsResponse, AnalyticsSummary, ChartPoint, DataStatus, FeedingSettings, HistoryPoint,
    HistoryResponse, HydrationResponse, LogSource, Period,
};
use coopsync_api::paths::{FEEDING_LOGS, FEEDING_SETTINGS, HISTORY, WATER_LOGS};

use crate::errors::AnalyticsError;
use crate::services::clock::Clock;
use crate::store::SharedStore;

/// Builds chart data from the log collections.
pub struct AnalyticsService {
    store: SharedStore,
    clock: Arc<dyn Clock>,
    calendar: Calendar,
}

fn source_location(source: LogSource) -> (&'static str, &'static str) {
    match source {
        LogSource::Feeding => (FEEDING_LOGS, "gramsDispensed"),
        LogSource::Water => (WATER_LOGS, "volumeDispensed"),
    }
}

impl AnalyticsService {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>, calendar: Calendar) -> Self {
        Self {
            store,
            clock,
            calendar,
        }
    }

    async fn samples(&self, source: LogSource) -> Result<Vec<Sample>, AnalyticsError> {
        let (path, field) = source_location(source);

        Ok(self
            .store
            .get(path)
            .await?
            .map(|node| clean_collection(&node, field))
            .unwrap_or_default())
    }

    pub async fn analytics(
        &self,
        source: LogSource,
        period: Period,
        compare: bool,
    ) -> Result<AnalyticsResponse, AnalyticsError> {
        let samples = self.samples(source).await?;
        let analytics = aggregate(&samples, period, compare, self.clock.now(), &self.calendar)?;

        let response = match analytics {
            Analytics::NoData => AnalyticsResponse {
                source,
                period,
                compare,
                status: DataStatus::NoData,
                points: Vec::new(),
                summary: None,
            },
            Analytics::Report(report) => AnalyticsResponse {
                source,
                period,
                compare,
                status: DataStatus::Ready,
                summary: Some(AnalyticsSummary {
                    total: report.summary.total,
                    average_per_day: report.summary.average_per_day,
                    peak_hour: report.summary.peak_hour_label(),
                    previous_total: report.previous_total,
                }),
                points: report
                    .points
                    .into_iter()
                    .map(|point| ChartPoint {
                        label: point.label,
                        current: point.current,
                        previous: point.previous,
                    })
                    .collect(),
            },
        };

        Ok(response)
    }

    pub async fn history(&self, period: Period, page: Option<usize>) -> Result<HistoryResponse, AnalyticsError> {
        let readings = self
            .store
            .get(HISTORY)
            .await?
            .map(|node| clean_readings(&node))
            .unwrap_or_default();

        let response = match history_page(&readings, period, page, self.clock.now(), &self.calendar) {
            Some(page) => HistoryResponse {
                period,
                status: DataStatus::Ready,
                page: page.page,
                total_pages: page.total_pages,
                points_per_page: page.points_per_page,
                points: page
                    .readings
                    .into_iter()
                    .map(|reading| HistoryPoint {
                        timestamp: reading.timestamp,
                        temperature: reading.temperature,
                        humidity: reading.humidity,
                    })
                    .collect(),
            },
            None => HistoryResponse {
                period,
                status: DataStatus::NoData,
                page: 0,
                total_pages: 0,
                points_per_page: points_per_page(period),
                points: Vec::new(),
            },
        };

        Ok(response)
    }

    /// Today's water per bird. The flock size comes from the feeding
    /// settings unless `chicken_count` overrides it.
    pub async fn hydration(&self, chicken_count: Option<u32>) -> Result<HydrationResponse, AnalyticsError> {
        let chicken_count = match chicken_count {
            Some(count) => count,
            None => FeedingSettings::from_value(
                &self.store.get(FEEDING_SETTINGS).await?.unwrap_or_default(),
            )
            .chicken_count,
        };

        let samples = self.samples(LogSource::Water).await?;
        let total = total_today(&samples, self.clock.now(), &self.calendar);
        let per_bird = water_per_bird(total, chicken_count);

        Ok(HydrationResponse {
            total_today: total,
            chicken_count,
            per_bird,
            status: classify_hydration(per_bird),
        })
    }
}

#[cfg(test)]
mod tests {
    use coopsync_api::models::HydrationStatus;
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::services::clock::FixedClock;
    use crate::store::MemoryStore;

    // 2024-03-15 12:00 UTC, a Friday
    const NOW: i64 = 1710504000;

    fn service(store: MemoryStore) -> AnalyticsService {
        AnalyticsService::new(
            Arc::new(store),
            Arc::new(FixedClock::new(datetime!(2024-03-15 12:00 UTC))),
            Calendar::default(),
        )
    }

    #[tokio::test]
    async fn test_feeding_day_chart() {
        let store = MemoryStore::with_data(json!({
            "feedingLogs": {
                "a": { "timestamp": NOW - 3 * 3600, "gramsDispensed": 150 },
                "b": { "timestamp": NOW - 3 * 3600 + 60, "gramsDispensed": "50" },
                "c": { "timestamp": NOW - 24 * 3600, "gramsDispensed": 100 },
                "d": { "timestamp": NOW, "gramsDispensed": "lots" },
            }
        }));

        let response = service(store)
            .analytics(LogSource::Feeding, Period::Day, true)
            .await
            .unwrap();

        assert_eq!(response.status, DataStatus::Ready);
        assert_eq!(response.points.len(), 24);
        assert_eq!(response.points[9].label, "09:00");
        assert_eq!(response.points[9].current, 200.0);
        assert_eq!(response.points[12].previous, Some(100.0));

        let summary = response.summary.unwrap();
        assert_eq!(summary.total, 300.0);
        assert_eq!(summary.average_per_day, 150.0);
        assert_eq!(summary.peak_hour.as_deref(), Some("09:00 - 10:00"));
    }

    #[tokio::test]
    async fn test_millisecond_timestamp_is_dropped() {
        let store = MemoryStore::with_data(json!({
            "feedingLogs": {
                "a": { "timestamp": NOW - 3600, "gramsDispensed": 120 },
                "b": { "timestamp": 1710500000000i64, "gramsDispensed": 80 },
            }
        }));

        let response = service(store)
            .analytics(LogSource::Feeding, Period::Day, false)
            .await
            .unwrap();

        assert_eq!(response.status, DataStatus::Ready);
        assert_eq!(response.points[11].current, 120.0);
        assert_eq!(response.summary.unwrap().total, 120.0);
    }

    #[tokio::test]
    async fn test_empty_logs_have_no_data() {
        let response = service(MemoryStore::new())
            .analytics(LogSource::Water, Period::Week, false)
            .await
            .unwrap();

        assert_eq!(response.status, DataStatus::NoData);
        assert!(response.points.is_empty());
        assert_eq!(response.summary, None);
    }

    #[tokio::test]
    async fn test_history_defaults_to_last_page() {
        let mut history = serde_json::Map::new();
        for i in 0..30 {
            history.insert(
                format!("h{i:02}"),
                json!({ "timestamp": NOW - i * 1800, "temperature": 20 + i }),
            );
        }
        let store = MemoryStore::with_data(json!({ "history": history }));

        let response = service(store).history(Period::Day, None).await.unwrap();

        // Readings since midnight: every half hour from 00:00 to 12:00.
        assert_eq!(response.total_pages, 2);
        assert_eq!(response.page, 1);
        assert_eq!(response.points.len(), 1);
        assert_eq!(response.points[0].timestamp, NOW);
    }

    #[tokio::test]
    async fn test_hydration_uses_stored_flock() {
        let store = MemoryStore::with_data(json!({
            "feedingSettings": { "chickenCount": 10 },
            "waterLogs": {
                "a": { "timestamp": NOW - 3600, "volumeDispensed": 1000 },
                "b": { "timestamp": NOW - 2 * 24 * 3600, "volumeDispensed": 5000 },
            }
        }));
        let analytics = service(store);

        let stored = analytics.hydration(None).await.unwrap();
        assert_eq!(stored.total_today, 1000.0);
        assert_eq!(stored.per_bird, 100.0);
        assert_eq!(stored.status, HydrationStatus::Alert);

        let overridden = analytics.hydration(Some(5)).await.unwrap();
        assert_eq!(overridden.per_bird, 200.0);
        assert_eq!(overridden.status, HydrationStatus::Normal);
    }
}
