//! The two seams the refresh job depends on, and their production adapters.

use std::future::Future;

use sqlx::PgPool;
use trendwatch_core::{AppConfig, InterestPoint, TrendRecord};
use trendwatch_db::DbError;
use trendwatch_trends::{TimeSeriesResponse, TimeWindow, TrendsClient, TrendsError};

use crate::RefreshError;

/// Read-all and overwrite-series access to stored trends.
pub trait TrendStore: Send + Sync {
    /// Snapshot of every stored trend, ordered by id.
    fn list_all(&self) -> impl Future<Output = Result<Vec<TrendRecord>, DbError>> + Send;

    /// Replaces one trend's series in its own transaction.
    fn update_series(
        &self,
        id: i64,
        points: &[InterestPoint],
    ) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Source of interest-over-time series keyed by search term.
pub trait InterestProvider: Send + Sync {
    fn fetch_interest_series(
        &self,
        keyword: &str,
        window: TimeWindow,
    ) -> impl Future<Output = Result<TimeSeriesResponse, TrendsError>> + Send;
}

/// [`TrendStore`] backed by the shared Postgres pool.
#[derive(Debug, Clone)]
pub struct PgTrendStore {
    pool: PgPool,
}

impl PgTrendStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TrendStore for PgTrendStore {
    async fn list_all(&self) -> Result<Vec<TrendRecord>, DbError> {
        let rows = trendwatch_db::list_trends(&self.pool).await?;
        Ok(rows.into_iter().map(TrendRecord::from).collect())
    }

    async fn update_series(&self, id: i64, points: &[InterestPoint]) -> Result<(), DbError> {
        trendwatch_db::update_interest_series(&self.pool, id, points).await
    }
}

impl InterestProvider for TrendsClient {
    async fn fetch_interest_series(
        &self,
        keyword: &str,
        window: TimeWindow,
    ) -> Result<TimeSeriesResponse, TrendsError> {
        TrendsClient::fetch_interest_series(self, keyword, window).await
    }
}

/// Builds the production provider client from application config.
///
/// # Errors
///
/// Returns [`RefreshError::Provider`] if the base URL is invalid or the HTTP
/// client cannot be constructed.
pub fn provider_from_config(config: &AppConfig) -> Result<TrendsClient, RefreshError> {
    let client = TrendsClient::with_base_url(
        &config.provider_base_url,
        config.provider_timeout_secs,
        config.provider_max_retries,
    )?;
    Ok(client)
}
