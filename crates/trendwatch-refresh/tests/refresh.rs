//! Refresh job behaviour against in-memory fakes of its store and provider.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use trendwatch_core::{is_chronological, AcceptancePolicy, InterestPoint, TrendRecord};
use trendwatch_db::DbError;
use trendwatch_refresh::{
    run_refresh, InterestProvider, RefreshConfig, RefreshError, RefreshSummary, TrendStore,
};
use trendwatch_trends::{TimeSeriesResponse, TimeWindow, TrendsError};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryStore {
    trends: Mutex<Vec<TrendRecord>>,
    failing_ids: HashSet<i64>,
    fail_snapshot: bool,
}

impl MemoryStore {
    fn with(trends: Vec<TrendRecord>) -> Self {
        Self {
            trends: Mutex::new(trends),
            ..Self::default()
        }
    }

    fn series(&self, id: i64) -> Vec<InterestPoint> {
        self.trends
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.interest_over_time.clone())
            .unwrap()
    }
}

impl TrendStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<TrendRecord>, DbError> {
        if self.fail_snapshot {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.trends.lock().unwrap().clone())
    }

    async fn update_series(&self, id: i64, points: &[InterestPoint]) -> Result<(), DbError> {
        if self.failing_ids.contains(&id) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let mut trends = self.trends.lock().unwrap();
        let trend = trends
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DbError::NotFound)?;
        trend.interest_over_time = points.to_vec();
        Ok(())
    }
}

#[derive(Clone)]
enum Scripted {
    Values(Vec<u32>),
    RateLimited,
    ServerError,
}

#[derive(Default)]
struct ScriptedProvider {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with(responses: &[(&str, Scripted)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl InterestProvider for ScriptedProvider {
    async fn fetch_interest_series(
        &self,
        keyword: &str,
        _window: TimeWindow,
    ) -> Result<TimeSeriesResponse, TrendsError> {
        self.calls.lock().unwrap().push(keyword.to_string());
        match self.responses.get(keyword) {
            Some(Scripted::Values(values)) => {
                Ok(TimeSeriesResponse::single(keyword, &weekly(values)))
            }
            Some(Scripted::RateLimited) => Err(TrendsError::RateLimited {
                retry_after_secs: None,
            }),
            Some(Scripted::ServerError) | None => Err(TrendsError::UnexpectedStatus {
                status: 500,
                url: "/trends/api/explore".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn weekly(values: &[u32]) -> Vec<InterestPoint> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
    values
        .iter()
        .zip(0u64..)
        .map(|(&value, week)| InterestPoint {
            date: start + Days::new(week * 7),
            value,
        })
        .collect()
}

fn trend(id: i64, name: &str, series: Vec<InterestPoint>) -> TrendRecord {
    TrendRecord {
        id,
        name: name.to_string(),
        description: None,
        category: "Technology".to_string(),
        date_discovered: NaiveDate::from_ymd_opt(2023, 3, 10).unwrap(),
        interest_over_time: series,
    }
}

fn no_delay() -> RefreshConfig {
    RefreshConfig {
        request_delay: Duration::ZERO,
        rate_limit_cooldown: Duration::ZERO,
        ..RefreshConfig::default()
    }
}

fn seeded_series() -> Vec<InterestPoint> {
    vec![
        InterestPoint {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            value: 60,
        },
        InterestPoint {
            date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            value: 65,
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accepted_series_is_stored_in_date_order() {
    let store = MemoryStore::with(vec![trend(1, "AI in Healthcare", vec![])]);
    let provider = ScriptedProvider::with(&[(
        "AI in Healthcare",
        Scripted::Values(vec![40, 72, 55, 61]),
    )]);

    let summary = run_refresh(&store, &provider, &no_delay()).await.unwrap();

    assert_eq!(summary.accepted, 1);
    let stored = store.series(1);
    assert_eq!(stored.len(), 4);
    assert!(is_chronological(&stored));
    assert_eq!(stored[1].value, 72);
}

#[tokio::test]
async fn flat_series_replaces_existing_data_with_empty() {
    let store = MemoryStore::with(vec![trend(1, "Sustainable Living", seeded_series())]);
    let provider = ScriptedProvider::with(&[(
        "Sustainable Living",
        Scripted::Values(vec![0, 0, 0, 0]),
    )]);

    let summary = run_refresh(&store, &provider, &no_delay()).await.unwrap();

    assert_eq!(summary.rejected, 1);
    assert!(store.series(1).is_empty());
}

#[tokio::test]
async fn monotonic_series_is_rejected_by_default_and_kept_by_reject_flat() {
    let rising = Scripted::Values(vec![10, 20, 30, 40]);

    let store = MemoryStore::with(vec![trend(1, "Remote Work Tools", seeded_series())]);
    let provider = ScriptedProvider::with(&[("Remote Work Tools", rising.clone())]);
    run_refresh(&store, &provider, &no_delay()).await.unwrap();
    assert!(store.series(1).is_empty());

    let store = MemoryStore::with(vec![trend(1, "Remote Work Tools", seeded_series())]);
    let provider = ScriptedProvider::with(&[("Remote Work Tools", rising)]);
    let config = RefreshConfig {
        policy: AcceptancePolicy::RejectFlat,
        ..no_delay()
    };
    run_refresh(&store, &provider, &config).await.unwrap();
    assert_eq!(store.series(1).len(), 4);
}

#[tokio::test]
async fn consecutive_runs_are_idempotent() {
    let store = MemoryStore::with(vec![
        trend(1, "Sustainable Living", seeded_series()),
        trend(2, "AI in Healthcare", vec![]),
        trend(3, "Remote Work Tools", vec![]),
    ]);
    let provider = ScriptedProvider::with(&[
        ("Sustainable Living", Scripted::Values(vec![50, 62, 58])),
        ("AI in Healthcare", Scripted::Values(vec![5, 5, 5])),
        ("Remote Work Tools", Scripted::Values(vec![80, 85, 79, 90])),
    ]);

    run_refresh(&store, &provider, &no_delay()).await.unwrap();
    let first: Vec<_> = (1..=3).map(|id| store.series(id)).collect();

    run_refresh(&store, &provider, &no_delay()).await.unwrap();
    let second: Vec<_> = (1..=3).map(|id| store.series(id)).collect();

    assert_eq!(first, second);
}

#[tokio::test]
async fn rate_limited_record_is_unchanged_and_later_records_still_run() {
    let store = MemoryStore::with(vec![
        trend(1, "Sustainable Living", seeded_series()),
        trend(2, "AI in Healthcare", vec![]),
    ]);
    let provider = ScriptedProvider::with(&[
        ("Sustainable Living", Scripted::RateLimited),
        ("AI in Healthcare", Scripted::Values(vec![70, 75, 68])),
    ]);

    let summary = run_refresh(&store, &provider, &no_delay()).await.unwrap();

    assert_eq!(summary.rate_limited, 1);
    assert_eq!(summary.accepted, 1);
    assert_eq!(store.series(1), seeded_series());
    assert_eq!(store.series(2).len(), 3);
    // The throttled record is not retried within the run.
    assert_eq!(
        provider.calls(),
        vec!["Sustainable Living".to_string(), "AI in Healthcare".to_string()]
    );
}

#[tokio::test]
async fn cooldown_follows_rate_limit_and_delay_follows_fetched_data() {
    let store = MemoryStore::with(vec![
        trend(1, "Sustainable Living", seeded_series()),
        trend(2, "AI in Healthcare", vec![]),
    ]);
    let provider = ScriptedProvider::with(&[
        ("Sustainable Living", Scripted::RateLimited),
        ("AI in Healthcare", Scripted::Values(vec![70, 75, 68])),
    ]);
    let config = RefreshConfig {
        request_delay: Duration::from_millis(100),
        rate_limit_cooldown: Duration::from_millis(300),
        ..RefreshConfig::default()
    };

    let started = Instant::now();
    let summary = run_refresh(&store, &provider, &config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.rate_limited, 1);
    assert_eq!(summary.accepted, 1);
    assert!(
        elapsed >= Duration::from_millis(400),
        "cool-down plus request delay should both elapse, took {elapsed:?}"
    );
}

#[tokio::test]
async fn request_delay_also_follows_rejected_data() {
    let store = MemoryStore::with(vec![trend(1, "Sustainable Living", seeded_series())]);
    let provider = ScriptedProvider::with(&[(
        "Sustainable Living",
        Scripted::Values(vec![0, 0, 0]),
    )]);
    let config = RefreshConfig {
        request_delay: Duration::from_millis(150),
        rate_limit_cooldown: Duration::from_secs(5),
        ..RefreshConfig::default()
    };

    let started = Instant::now();
    let summary = run_refresh(&store, &provider, &config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.rejected, 1);
    assert!(elapsed >= Duration::from_millis(150), "took {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
}

#[tokio::test]
async fn provider_error_does_not_pause() {
    let store = MemoryStore::with(vec![
        trend(1, "Sustainable Living", seeded_series()),
        trend(2, "AI in Healthcare", vec![]),
    ]);
    let provider = ScriptedProvider::with(&[
        ("Sustainable Living", Scripted::ServerError),
        ("AI in Healthcare", Scripted::ServerError),
    ]);
    let config = RefreshConfig {
        request_delay: Duration::from_secs(5),
        rate_limit_cooldown: Duration::from_secs(5),
        ..RefreshConfig::default()
    };

    let started = Instant::now();
    let summary = run_refresh(&store, &provider, &config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.provider_errors, 2);
    assert!(
        elapsed < Duration::from_secs(1),
        "provider errors should move straight on, took {elapsed:?}"
    );
}

#[tokio::test]
async fn provider_error_skips_record_without_writing() {
    let store = MemoryStore::with(vec![
        trend(1, "Sustainable Living", seeded_series()),
        trend(2, "AI in Healthcare", vec![]),
    ]);
    let provider = ScriptedProvider::with(&[
        ("Sustainable Living", Scripted::ServerError),
        ("AI in Healthcare", Scripted::Values(vec![70, 75, 68])),
    ]);

    let summary = run_refresh(&store, &provider, &no_delay()).await.unwrap();

    assert_eq!(summary.provider_errors, 1);
    assert_eq!(store.series(1), seeded_series());
    assert_eq!(summary.accepted, 1);
}

#[tokio::test]
async fn storage_failure_skips_record_and_continues() {
    let mut store = MemoryStore::with(vec![
        trend(1, "Sustainable Living", seeded_series()),
        trend(2, "AI in Healthcare", vec![]),
    ]);
    store.failing_ids.insert(1);
    let provider = ScriptedProvider::with(&[
        ("Sustainable Living", Scripted::Values(vec![50, 62, 58])),
        ("AI in Healthcare", Scripted::Values(vec![70, 75, 68])),
    ]);

    let summary = run_refresh(&store, &provider, &no_delay()).await.unwrap();

    assert_eq!(
        summary,
        RefreshSummary {
            total: 2,
            accepted: 1,
            rejected: 0,
            rate_limited: 0,
            provider_errors: 0,
            storage_errors: 1,
        }
    );
    assert_eq!(store.series(1), seeded_series());
    assert_eq!(store.series(2).len(), 3);
}

#[tokio::test]
async fn empty_store_returns_zero_summary() {
    let store = MemoryStore::default();
    let provider = ScriptedProvider::default();

    let summary = run_refresh(&store, &provider, &no_delay()).await.unwrap();

    assert_eq!(summary, RefreshSummary::default());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn snapshot_failure_is_an_error() {
    let store = MemoryStore {
        fail_snapshot: true,
        ..MemoryStore::default()
    };
    let provider = ScriptedProvider::default();

    let err = run_refresh(&store, &provider, &no_delay())
        .await
        .unwrap_err();

    assert!(matches!(err, RefreshError::Snapshot(_)));
}
