use trendwatch_core::TrendRecord;
use trendwatch_db::DbError;

const NAME_WIDTH: usize = 40;

/// Print stored trends, optionally filtered by category substring.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_list(pool: &sqlx::PgPool, category: Option<&str>) -> anyhow::Result<()> {
    let rows = match category {
        Some(text) => trendwatch_db::list_trends_by_category(pool, text).await?,
        None => trendwatch_db::list_trends(pool).await?,
    };

    if rows.is_empty() {
        println!(
            "no trends found{}; run `init-and-seed` first",
            category
                .map(|c| format!(" for category '{c}'"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "{:<6}{:<16}{:<13}{:<8}NAME",
        "ID", "CATEGORY", "DISCOVERED", "POINTS"
    );
    for row in rows {
        println!("{}", list_line(&TrendRecord::from(row)));
    }
    Ok(())
}

/// Print one trend and its interest series.
///
/// # Errors
///
/// Returns an error if the trend does not exist or the query fails.
pub(crate) async fn run_show(pool: &sqlx::PgPool, id: i64) -> anyhow::Result<()> {
    let trend = match trendwatch_db::get_trend(pool, id).await {
        Ok(row) => TrendRecord::from(row),
        Err(DbError::NotFound) => anyhow::bail!("trend {id} not found"),
        Err(e) => return Err(e.into()),
    };

    println!("{} (#{})", trend.name, trend.id);
    println!("Category:   {}", trend.category);
    println!("Discovered: {}", trend.date_discovered);
    if let Some(description) = &trend.description {
        println!("About:      {description}");
    }
    println!();

    if trend.interest_over_time.is_empty() {
        println!("no interest data");
        return Ok(());
    }
    println!("{:<12}VALUE", "DATE");
    for point in &trend.interest_over_time {
        println!("{:<12}{}", point.date, point.value);
    }
    Ok(())
}

fn list_line(trend: &TrendRecord) -> String {
    format!(
        "{:<6}{:<16}{:<13}{:<8}{}",
        trend.id,
        truncate(&trend.category, 15),
        trend.date_discovered,
        trend.interest_over_time.len(),
        truncate(&trend.name, NAME_WIDTH)
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
