/// Apply migrations and insert the seed trends that are not stored yet.
///
/// Safe to run repeatedly: trends are matched by name, so a second run
/// reports every entry as skipped.
///
/// # Errors
///
/// Returns an error if the seed file cannot be read or parsed, a migration
/// fails, or the insert transaction fails.
pub(crate) async fn run_init_and_seed(
    pool: &sqlx::PgPool,
    config: &trendwatch_core::AppConfig,
) -> anyhow::Result<()> {
    let applied = trendwatch_db::run_migrations(pool).await?;
    tracing::info!(applied, "migrations applied");

    let seed = trendwatch_core::load_seed_trends(&config.seed_path)?;
    let report = trendwatch_db::seed_trends(pool, &seed.trends).await?;

    tracing::info!(
        path = %config.seed_path.display(),
        inserted = report.inserted,
        skipped = report.skipped,
        "seed complete"
    );
    println!(
        "seeded {} trend(s), {} already present",
        report.inserted, report.skipped
    );
    Ok(())
}
