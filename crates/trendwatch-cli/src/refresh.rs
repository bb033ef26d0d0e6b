use trendwatch_refresh::{provider_from_config, run_refresh, PgTrendStore, RefreshConfig};

/// Run the interest refresh once over every stored trend.
///
/// Per-trend failures are logged by the job and do not fail the command.
///
/// # Errors
///
/// Returns an error if the provider client cannot be built or the stored
/// trends cannot be loaded.
pub(crate) async fn run_refresh_trends(
    pool: &sqlx::PgPool,
    config: &trendwatch_core::AppConfig,
) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let store = PgTrendStore::new(pool.clone());
    let refresh_config = RefreshConfig::from_app_config(config);

    let summary = run_refresh(&store, &provider, &refresh_config).await?;

    println!(
        "refreshed {} trend(s): {} accepted, {} rejected, {} skipped",
        summary.total,
        summary.accepted,
        summary.rejected,
        summary.skipped()
    );
    Ok(())
}
