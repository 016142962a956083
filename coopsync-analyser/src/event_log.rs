use coopsync_api::models::{EventEntry, EventFilter, EventKind};
use coopsync_api::parse::{text_field, timestamp_field};
use serde_json::Value;
use time::OffsetDateTime;

use crate::calendar::{Calendar, SECONDS_PER_DAY};
use crate::sample::children;

/// Reads one `/events` record; records without a timestamp are dropped.
pub fn event_entry(id: &str, record: &Value) -> Option<EventEntry> {
    let timestamp = timestamp_field(record, "timestamp")?;
    let raw_kind = text_field(record, "type").unwrap_or("other");
    let kind = EventKind::parse(raw_kind);

    let description = text_field(record, "description")
        .unwrap_or(kind.default_description())
        .to_string();

    Some(EventEntry {
        id: id.to_string(),
        timestamp,
        kind: raw_kind.to_string(),
        description,
        severity: kind.severity(),
    })
}

/// Reads an `/events` node, newest first.
pub fn event_entries(collection: &Value) -> Vec<EventEntry> {
    let mut entries: Vec<EventEntry> = children(collection)
        .into_iter()
        .filter_map(|(id, record)| event_entry(&id, record))
        .collect();

    sort_newest_first(&mut entries);
    entries
}

pub fn sort_newest_first(entries: &mut [EventEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

/// Oldest timestamp still shown by `filter`, or `None` for no limit.
pub fn event_cutoff(filter: EventFilter, now: OffsetDateTime, calendar: &Calendar) -> Option<i64> {
    let now_ts = now.unix_timestamp();

    match filter {
        EventFilter::Day => Some(calendar.start_of_day(calendar.today(now))),
        EventFilter::Week => Some(now_ts - 7 * SECONDS_PER_DAY),
        EventFilter::Month => Some(now_ts - 30 * SECONDS_PER_DAY),
        EventFilter::All => None,
    }
}

/// Applies the recency filter and orders newest first.
pub fn select_events(
    entries: &[EventEntry],
    filter: EventFilter,
    now: OffsetDateTime,
    calendar: &Calendar,
) -> Vec<EventEntry> {
    let cutoff = event_cutoff(filter, now, calendar);

    let mut selected: Vec<EventEntry> = entries
        .iter()
        .filter(|entry| cutoff.is_none_or(|cutoff| entry.timestamp >= cutoff))
        .cloned()
        .collect();

    sort_newest_first(&mut selected);
    selected
}
