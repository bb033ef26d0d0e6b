use sqlx::types::Json;
use sqlx::PgPool;
use trendwatch_core::NewTrend;

use crate::DbError;

/// Counts reported by [`seed_trends`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert the seed trends, skipping any whose name already exists
/// (compared case-insensitively after trimming).
///
/// All inserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::InvalidTrend`] if a seed entry fails validation, or
/// [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_trends(pool: &PgPool, trends: &[NewTrend]) -> Result<SeedReport, DbError> {
    for trend in trends {
        trend.validate()?;
    }

    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    for trend in trends {
        let inserted: Option<i64> = sqlx::query_scalar(
            "INSERT INTO trends (name, description, category, date_discovered, interest_over_time) \
             SELECT $1, $2, $3, COALESCE($4, CURRENT_DATE), $5 \
             WHERE NOT EXISTS (SELECT 1 FROM trends WHERE lower(name) = lower($1::text)) \
             RETURNING id",
        )
        .bind(trend.name.trim())
        .bind(&trend.description)
        .bind(trend.category.trim())
        .bind(trend.date_discovered)
        .bind(Json(&trend.interest_over_time))
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_some() {
            report.inserted += 1;
        } else {
            report.skipped += 1;
        }
    }

    tx.commit().await?;
    Ok(report)
}
