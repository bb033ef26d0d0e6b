use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One `(date, score)` sample of an interest series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestPoint {
    pub date: NaiveDate,
    pub value: u32,
}

/// A stored trend as exposed to API clients and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub date_discovered: NaiveDate,
    pub interest_over_time: Vec<InterestPoint>,
}

/// Insert payload for a trend that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrend {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    /// `None` lets storage default to the creation date.
    #[serde(default)]
    pub date_discovered: Option<NaiveDate>,
    #[serde(default)]
    pub interest_over_time: Vec<InterestPoint>,
}

/// Column widths of `trends.name` and `trends.category`, in characters.
pub const NAME_MAX_CHARS: usize = 100;
pub const CATEGORY_MAX_CHARS: usize = 50;

impl NewTrend {
    /// Checks the invariants storage relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `name` or `category` is blank or
    /// longer than its column, or the initial series is not in ascending date
    /// order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "trend name must be non-empty".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "trend '{}' must have a non-empty category",
                self.name
            )));
        }
        let name_chars = self.name.trim().chars().count();
        if name_chars > NAME_MAX_CHARS {
            return Err(ConfigError::Validation(format!(
                "trend name is {name_chars} characters; at most {NAME_MAX_CHARS} allowed"
            )));
        }
        let category_chars = self.category.trim().chars().count();
        if category_chars > CATEGORY_MAX_CHARS {
            return Err(ConfigError::Validation(format!(
                "trend '{}' category is {category_chars} characters; \
                 at most {CATEGORY_MAX_CHARS} allowed",
                self.name
            )));
        }
        if !is_chronological(&self.interest_over_time) {
            return Err(ConfigError::Validation(format!(
                "trend '{}' has an interest series out of date order",
                self.name
            )));
        }
        Ok(())
    }
}

/// Returns `true` when every point is strictly later than the one before it.
#[must_use]
pub fn is_chronological(points: &[InterestPoint]) -> bool {
    points.windows(2).all(|w| w[0].date < w[1].date)
}

/// Which provider series the refresh job treats as carrying real signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcceptancePolicy {
    /// Reject empty, flat and monotonic series. Steadily rising or falling
    /// trends are rejected along with the all-zero responses.
    #[default]
    RejectMonotonic,
    /// Reject only empty series and series with a single distinct value.
    RejectFlat,
}

impl std::fmt::Display for AcceptancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptancePolicy::RejectMonotonic => write!(f, "reject-monotonic"),
            AcceptancePolicy::RejectFlat => write!(f, "reject-flat"),
        }
    }
}

impl FromStr for AcceptancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject-monotonic" => Ok(AcceptancePolicy::RejectMonotonic),
            "reject-flat" => Ok(AcceptancePolicy::RejectFlat),
            other => Err(format!(
                "unknown acceptance policy '{other}'; expected reject-monotonic or reject-flat"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub trends: Vec<NewTrend>,
}

/// Load and validate the seed trends from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed_trends(path: &Path) -> Result<SeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_seed_trends(&content)
}

/// Parse and validate seed trends from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text cannot be parsed or fails validation.
pub fn parse_seed_trends(content: &str) -> Result<SeedFile, ConfigError> {
    let seed_file: SeedFile = serde_yaml::from_str(content)?;
    validate_seed(&seed_file)?;
    Ok(seed_file)
}

fn validate_seed(seed_file: &SeedFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for trend in &seed_file.trends {
        trend.validate()?;

        if !seen_names.insert(trend.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate trend name: '{}'",
                trend.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "trends_test.rs"]
mod tests;
