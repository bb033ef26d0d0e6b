//! The sequential refresh loop.

use std::time::Duration;

use trendwatch_core::{AcceptancePolicy, AppConfig, TrendRecord};
use trendwatch_trends::TimeWindow;

use crate::acceptance::{evaluate, RejectReason};
use crate::ports::{InterestProvider, TrendStore};
use crate::RefreshError;

const DEFAULT_REQUEST_DELAY_MS: u64 = 1_000;
const DEFAULT_RATE_LIMIT_COOLDOWN_SECS: u64 = 60;

/// Knobs for one refresh run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Pause after every provider call that returned data.
    pub request_delay: Duration,
    /// Job-wide pause after the provider signals throttling.
    pub rate_limit_cooldown: Duration,
    pub policy: AcceptancePolicy,
    pub window: TimeWindow,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            rate_limit_cooldown: Duration::from_secs(DEFAULT_RATE_LIMIT_COOLDOWN_SECS),
            policy: AcceptancePolicy::default(),
            window: TimeWindow::TRAILING_YEAR,
        }
    }
}

impl RefreshConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_delay: Duration::from_millis(config.refresh_delay_ms),
            rate_limit_cooldown: Duration::from_secs(config.rate_limit_cooldown_secs),
            policy: config.acceptance_policy,
            window: TimeWindow::TRAILING_YEAR,
        }
    }
}

/// Why a record was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    RateLimited,
    Provider(String),
    Storage(String),
}

/// Result of refreshing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new series with `points` entries was committed.
    Accepted { points: usize },
    /// The series was rejected and an empty one committed.
    Rejected { reason: RejectReason },
    /// Nothing was written.
    Skipped(SkipReason),
}

/// Per-run tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub rate_limited: usize,
    pub provider_errors: usize,
    pub storage_errors: usize,
}

impl RefreshSummary {
    fn record(&mut self, outcome: &RecordOutcome) {
        self.total += 1;
        match outcome {
            RecordOutcome::Accepted { .. } => self.accepted += 1,
            RecordOutcome::Rejected { .. } => self.rejected += 1,
            RecordOutcome::Skipped(SkipReason::RateLimited) => self.rate_limited += 1,
            RecordOutcome::Skipped(SkipReason::Provider(_)) => self.provider_errors += 1,
            RecordOutcome::Skipped(SkipReason::Storage(_)) => self.storage_errors += 1,
        }
    }

    /// Records that were left untouched.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.rate_limited + self.provider_errors + self.storage_errors
    }
}

/// Refreshes every stored trend once, in id order.
///
/// Per-record failures are logged and counted, never propagated. Each
/// record's write commits independently, so an interrupted run leaves the
/// records processed so far updated.
///
/// # Errors
///
/// Returns [`RefreshError::Snapshot`] if the initial list of trends cannot be
/// loaded.
pub async fn run_refresh<S, P>(
    store: &S,
    provider: &P,
    config: &RefreshConfig,
) -> Result<RefreshSummary, RefreshError>
where
    S: TrendStore,
    P: InterestProvider,
{
    let trends = store.list_all().await.map_err(RefreshError::Snapshot)?;
    let mut summary = RefreshSummary::default();

    if trends.is_empty() {
        tracing::info!("no trends found, nothing to refresh");
        return Ok(summary);
    }

    tracing::info!(
        count = trends.len(),
        policy = %config.policy,
        "starting interest refresh"
    );

    for trend in &trends {
        let outcome = refresh_one(store, provider, config, trend).await;
        summary.record(&outcome);
    }

    tracing::info!(
        total = summary.total,
        accepted = summary.accepted,
        rejected = summary.rejected,
        rate_limited = summary.rate_limited,
        provider_errors = summary.provider_errors,
        storage_errors = summary.storage_errors,
        "interest refresh complete"
    );

    Ok(summary)
}

async fn refresh_one<S, P>(
    store: &S,
    provider: &P,
    config: &RefreshConfig,
    trend: &TrendRecord,
) -> RecordOutcome
where
    S: TrendStore,
    P: InterestProvider,
{
    tracing::debug!(trend = %trend.name, id = trend.id, "fetching interest series");

    let response = match provider
        .fetch_interest_series(&trend.name, config.window)
        .await
    {
        Ok(response) => response,
        Err(e) if e.is_rate_limited() => {
            tracing::warn!(
                trend = %trend.name,
                cooldown_secs = config.rate_limit_cooldown.as_secs(),
                "rate limited by provider, cooling down"
            );
            tokio::time::sleep(config.rate_limit_cooldown).await;
            return RecordOutcome::Skipped(SkipReason::RateLimited);
        }
        Err(e) => {
            tracing::warn!(trend = %trend.name, error = %e, "provider fetch failed, skipping");
            return RecordOutcome::Skipped(SkipReason::Provider(e.to_string()));
        }
    };

    tokio::time::sleep(config.request_delay).await;

    let (points, outcome) = match evaluate(config.policy, &trend.name, &response) {
        Ok(points) => {
            let count = points.len();
            (points, RecordOutcome::Accepted { points: count })
        }
        Err(reason) => (Vec::new(), RecordOutcome::Rejected { reason }),
    };

    if let Err(e) = store.update_series(trend.id, &points).await {
        tracing::error!(trend = %trend.name, id = trend.id, error = %e, "failed to store series");
        return RecordOutcome::Skipped(SkipReason::Storage(e.to_string()));
    }

    match &outcome {
        RecordOutcome::Accepted { points } => {
            tracing::info!(trend = %trend.name, points, "stored interest series");
        }
        RecordOutcome::Rejected { reason } => {
            tracing::info!(trend = %trend.name, %reason, "series rejected, stored empty");
        }
        RecordOutcome::Skipped(_) => {}
    }

    outcome
}
