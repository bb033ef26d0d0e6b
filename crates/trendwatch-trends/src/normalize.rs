//! Conversion of multiline widget data into a [`TimeSeriesResponse`].

use chrono::{DateTime, NaiveDate};

use crate::series::{TimeSeriesResponse, TimeSeriesRow};
use crate::types::{MultilineResponse, TimelinePoint};

/// Converts widget data for `keywords` into a table keyed by UTC calendar date.
///
/// Samples with an unparseable timestamp or the wrong number of values are
/// dropped with a warning. Rows are sorted ascending by date; when two samples
/// land on the same date the later one wins. An empty timeline yields an
/// empty response with no columns.
#[must_use]
pub fn normalize_timeline(keywords: &[&str], response: &MultilineResponse) -> TimeSeriesResponse {
    let mut rows: Vec<TimeSeriesRow> = response
        .default
        .timeline_data
        .iter()
        .filter_map(|point| normalize_point(keywords.len(), point))
        .collect();

    if rows.is_empty() {
        return TimeSeriesResponse::default();
    }

    rows.sort_by_key(|r| r.date);
    // dedup_by keeps the first of each run; reverse so the latest sample survives.
    rows.reverse();
    rows.dedup_by_key(|r| r.date);
    rows.reverse();

    TimeSeriesResponse {
        columns: keywords.iter().map(|k| (*k).to_string()).collect(),
        rows,
    }
}

fn normalize_point(expected_values: usize, point: &TimelinePoint) -> Option<TimeSeriesRow> {
    let Some(date) = parse_unix_date(&point.time) else {
        tracing::warn!(time = %point.time, "dropping timeline sample with invalid timestamp");
        return None;
    };

    if point.value.len() != expected_values {
        tracing::warn!(
            %date,
            got = point.value.len(),
            expected = expected_values,
            "dropping timeline sample with unexpected value count"
        );
        return None;
    }

    Some(TimeSeriesRow {
        date,
        values: point.value.clone(),
        is_partial: point.is_partial,
    })
}

/// Parses a unix-seconds string into its UTC calendar date.
fn parse_unix_date(raw: &str) -> Option<NaiveDate> {
    let secs = raw.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
