//! Custom types for common data structures and validation

use chrono::{DateTime as ChronoDateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard UTC DateTime type used across all Tally crates
///
/// This is the canonical datetime type for:
/// - API responses (serializes as ISO 8601 with 'Z' suffix)
/// - Database TIMESTAMPTZ columns
pub type UtcDateTime = ChronoDateTime<Utc>;

/// Calendar-date key used to group all counters and sessions.
///
/// Always the UTC date formatted as `YYYY-MM-DD`. Because the format is
/// zero-padded, lexicographic ordering equals chronological ordering, so
/// date-range filters compare keys directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[schema(value_type = String, example = "2026-01-15")]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    /// Derive the date key from an instant, truncating to the UTC calendar date.
    pub fn from_datetime(at: UtcDateTime) -> Self {
        DateKey(at.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid date key '{0}', expected YYYY-MM-DD")]
pub struct DateKeyError(pub String);

impl std::str::FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed =
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DateKeyError(s.to_string()))?;
        // Reject unpadded inputs like "2026-1-5": they parse but would
        // break lexicographic range comparison.
        if parsed.format("%Y-%m-%d").to_string() != s {
            return Err(DateKeyError(s.to_string()));
        }
        Ok(DateKey(s.to_string()))
    }
}
