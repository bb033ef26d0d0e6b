//! Database operations for the `trends` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use trendwatch_core::{InterestPoint, NewTrend, TrendRecord};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `trends` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub date_discovered: NaiveDate,
    /// JSONB array of `{date, value}` objects, ascending by date.
    pub interest_over_time: Json<Vec<InterestPoint>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrendRow> for TrendRecord {
    fn from(row: TrendRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            date_discovered: row.date_discovered,
            interest_over_time: row.interest_over_time.0,
        }
    }
}

const TREND_COLUMNS: &str = "id, name, description, category, date_discovered, \
                             interest_over_time, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every trend, ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trends(pool: &PgPool) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(&format!(
        "SELECT {TREND_COLUMNS} FROM trends ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single trend by `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_trend(pool: &PgPool, id: i64) -> Result<TrendRow, DbError> {
    let row = sqlx::query_as::<_, TrendRow>(&format!(
        "SELECT {TREND_COLUMNS} FROM trends WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns trends whose category contains `text`, ignoring case.
///
/// `%`, `_` and `\` in `text` match literally.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trends_by_category(pool: &PgPool, text: &str) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(&format!(
        "SELECT {TREND_COLUMNS} FROM trends \
         WHERE category ILIKE '%' || $1 || '%' ESCAPE '\\' \
         ORDER BY id"
    ))
    .bind(escape_like(text))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a new trend and returns the stored row.
///
/// A missing `date_discovered` defaults to today's date in the database.
///
/// # Errors
///
/// Returns [`DbError::InvalidTrend`] if the payload fails validation, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_trend(pool: &PgPool, trend: &NewTrend) -> Result<TrendRow, DbError> {
    trend.validate()?;

    let row = sqlx::query_as::<_, TrendRow>(&format!(
        "INSERT INTO trends (name, description, category, date_discovered, interest_over_time) \
         VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5) \
         RETURNING {TREND_COLUMNS}"
    ))
    .bind(trend.name.trim())
    .bind(&trend.description)
    .bind(trend.category.trim())
    .bind(trend.date_discovered)
    .bind(Json(&trend.interest_over_time))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Overwrites the interest series of one trend and commits.
///
/// Runs in its own transaction; on any failure the transaction is rolled
/// back and rows committed earlier are left untouched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the trend no longer exists, or
/// [`DbError::Sqlx`] if the update or commit fails.
pub async fn update_interest_series(
    pool: &PgPool,
    id: i64,
    points: &[InterestPoint],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE trends \
         SET interest_over_time = $1, updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(Json(points))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(DbError::NotFound);
    }

    tx.commit().await?;
    Ok(())
}

/// Escapes `LIKE` metacharacters so user text is matched literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_passes_plain_text_through() {
        assert_eq!(escape_like("tech"), "tech");
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
    }

    #[test]
    fn trend_row_converts_to_record() {
        let row = TrendRow {
            id: 3,
            name: "Remote Work Tools".to_string(),
            description: Some("Software".to_string()),
            category: "Technology".to_string(),
            date_discovered: NaiveDate::from_ymd_opt(2022, 11, 20).expect("date"),
            interest_over_time: Json(vec![InterestPoint {
                date: NaiveDate::from_ymd_opt(2022, 12, 1).expect("date"),
                value: 80,
            }]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let record = TrendRecord::from(row);
        assert_eq!(record.id, 3);
        assert_eq!(record.category, "Technology");
        assert_eq!(record.interest_over_time.len(), 1);
        assert_eq!(record.interest_over_time[0].value, 80);
    }
}
