//! Decides whether a fetched series is worth storing.

use std::collections::HashSet;
use std::fmt;

use trendwatch_core::{AcceptancePolicy, InterestPoint};
use trendwatch_trends::TimeSeriesResponse;

/// Why a fetched series was replaced by an empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The provider returned no rows.
    Empty,
    /// No column matched the requested keyword.
    MissingColumn,
    /// Every value is identical (a single point included).
    Flat,
    /// Values only rise or only fall.
    Monotonic,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::Empty => "empty series",
            RejectReason::MissingColumn => "no column for keyword",
            RejectReason::Flat => "flat series",
            RejectReason::Monotonic => "monotonic series",
        };
        f.write_str(s)
    }
}

/// Applies `policy` to the provider response for `keyword`.
///
/// On acceptance returns the points sorted ascending by date with duplicate
/// dates removed.
///
/// # Errors
///
/// Returns the [`RejectReason`] when the series must be stored as empty.
pub fn evaluate(
    policy: AcceptancePolicy,
    keyword: &str,
    response: &TimeSeriesResponse,
) -> Result<Vec<InterestPoint>, RejectReason> {
    if response.is_empty() {
        return Err(RejectReason::Empty);
    }
    let mut points = response.column(keyword).ok_or(RejectReason::MissingColumn)?;
    if points.is_empty() {
        return Err(RejectReason::Empty);
    }

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    let values: Vec<u32> = points.iter().map(|p| p.value).collect();
    if distinct_count(&values) <= 1 {
        return Err(RejectReason::Flat);
    }
    if policy == AcceptancePolicy::RejectMonotonic && is_monotonic(&values) {
        return Err(RejectReason::Monotonic);
    }

    Ok(points)
}

fn distinct_count(values: &[u32]) -> usize {
    values.iter().collect::<HashSet<_>>().len()
}

/// `true` if `values` never decreases or never increases.
fn is_monotonic(values: &[u32]) -> bool {
    let non_decreasing = values.windows(2).all(|w| w[0] <= w[1]);
    let non_increasing = values.windows(2).all(|w| w[0] >= w[1]);
    non_decreasing || non_increasing
}
