use thiserror::Error;

/// Failures that stop a refresh run before any record is processed.
///
/// Per-record problems never surface here; they become
/// [`SkipReason`](crate::SkipReason) values in the run's outcomes.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The snapshot of stored trends could not be loaded.
    #[error("failed to load trends: {0}")]
    Snapshot(#[source] trendwatch_db::DbError),

    /// The provider client could not be constructed.
    #[error("failed to build provider client: {0}")]
    Provider(#[from] trendwatch_trends::TrendsError),
}
