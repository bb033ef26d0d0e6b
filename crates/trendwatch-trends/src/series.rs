//! Provider-neutral time-series response handed to the refresh job.

use chrono::NaiveDate;
use trendwatch_core::InterestPoint;

/// Time range requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    TrailingMonths(u16),
}

impl TimeWindow {
    /// The last twelve months, the window the refresh job uses.
    pub const TRAILING_YEAR: TimeWindow = TimeWindow::TrailingMonths(12);

    /// Renders the window in the provider's `time` syntax.
    #[must_use]
    pub fn as_timeframe(self) -> String {
        match self {
            TimeWindow::TrailingMonths(n) => format!("today {n}-m"),
        }
    }
}

/// One dated row with a value per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesRow {
    pub date: NaiveDate,
    pub values: Vec<u32>,
    /// The provider is still collecting data for this period.
    pub is_partial: bool,
}

/// A table of interest scores: one column per keyword, rows ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSeriesResponse {
    pub columns: Vec<String>,
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeriesResponse {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extracts the series for `keyword`, or `None` when no column matches.
    #[must_use]
    pub fn column(&self, keyword: &str) -> Option<Vec<InterestPoint>> {
        let idx = self.columns.iter().position(|c| c == keyword)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| {
                    row.values.get(idx).map(|&value| InterestPoint {
                        date: row.date,
                        value,
                    })
                })
                .collect(),
        )
    }

    /// Builds a single-column response, mostly for tests and fakes.
    #[must_use]
    pub fn single(keyword: &str, points: &[InterestPoint]) -> Self {
        Self {
            columns: vec![keyword.to_string()],
            rows: points
                .iter()
                .map(|p| TimeSeriesRow {
                    date: p.date,
                    values: vec![p.value],
                    is_partial: false,
                })
                .collect(),
        }
    }
}
