//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and, when
//! `TRENDWATCH_REFRESH_CRON` is set, registers the interest refresh job.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendwatch_core::AppConfig;
use trendwatch_refresh::{provider_from_config, run_refresh, PgTrendStore, RefreshConfig};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match config.refresh_cron.clone() {
        Some(cron) => register_refresh_job(&scheduler, &cron, pool, config).await?,
        None => {
            tracing::info!("scheduler: TRENDWATCH_REFRESH_CRON not set; scheduled refresh disabled");
        }
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the interest refresh job on `cron`.
///
/// A tick that fires while the previous run is still going is skipped.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    cron: &str,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let store = PgTrendStore::new(pool);
    let running = Arc::new(Mutex::new(()));

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let store = store.clone();
        let config = Arc::clone(&config);
        let running = Arc::clone(&running);

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous refresh still running; skipping tick");
                return;
            };
            tracing::info!("scheduler: starting interest refresh");
            run_scheduled_refresh(&store, &config).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: interest refresh registered");
    Ok(())
}

async fn run_scheduled_refresh(store: &PgTrendStore, config: &AppConfig) {
    let provider = match provider_from_config(config) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to build provider client");
            return;
        }
    };

    let refresh_config = RefreshConfig::from_app_config(config);
    match run_refresh(store, &provider, &refresh_config).await {
        Ok(summary) => {
            tracing::info!(
                accepted = summary.accepted,
                rejected = summary.rejected,
                skipped = summary.skipped(),
                "scheduler: interest refresh complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: interest refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with_cron(cron: Option<&str>) -> Arc<AppConfig> {
        let mut vars = HashMap::from([(
            "DATABASE_URL".to_string(),
            "postgres://localhost/trendwatch_test".to_string(),
        )]);
        if let Some(cron) = cron {
            vars.insert("TRENDWATCH_REFRESH_CRON".to_string(), cron.to_string());
        }
        let config = trendwatch_core::build_app_config(|key| {
            vars.get(key).cloned().ok_or(std::env::VarError::NotPresent)
        })
        .expect("config");
        Arc::new(config)
    }

    fn lazy_pool() -> PgPool {
        PgPool::connect_lazy("postgres://localhost/trendwatch_test").expect("lazy pool")
    }

    #[tokio::test]
    async fn invalid_cron_fails_startup() {
        let result = build_scheduler(lazy_pool(), config_with_cron(Some("not a cron"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn scheduler_starts_without_cron() {
        let mut scheduler = build_scheduler(lazy_pool(), config_with_cron(None))
            .await
            .expect("scheduler");
        scheduler.shutdown().await.expect("shutdown");
    }
}
