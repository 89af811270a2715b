/// Database layer
///
/// Connection setup, schema, and the text <-> chrono conversions used by
/// every storage module (dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339).

pub mod database;

pub use database::{connect, init_schema};

use crate::error::{HrmsError, HrmsResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Open a write transaction holding SQLite's write lock from the first statement
///
/// Workflows read before they write; under a deferred `BEGIN` a concurrent
/// writer makes the lock upgrade fail with SQLITE_BUSY instead of waiting.
pub async fn begin_write(pool: &SqlitePool) -> HrmsResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Current time as stored in `created_at` / `updated_at` columns
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Today's date as stored in date columns
pub fn today() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> HrmsResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| HrmsError::Internal(format!("invalid stored date '{}': {}", value, e)))
}

pub fn parse_optional_date(value: Option<String>) -> HrmsResult<Option<NaiveDate>> {
    value.as_deref().map(parse_date).transpose()
}

pub fn parse_timestamp(value: &str) -> HrmsResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| HrmsError::Internal(format!("invalid stored timestamp '{}': {}", value, e)))
}

/// Parse an enum column; a value the enum rejects means the row is corrupt
pub fn parse_stored<T: FromStr>(value: &str) -> HrmsResult<T> {
    value
        .parse()
        .map_err(|_| HrmsError::Internal(format!("unexpected stored value '{}'", value)))
}

/// Serde helper for optional request dates: `null`, missing and `""` all mean "no date"
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{}': {}", text, e))),
    }
}

/// Serde helper for request dates that can be cleared
///
/// Missing stays `None` (with `#[serde(default)]`), `null` or `""` becomes
/// `Some(None)`, and a date becomes `Some(Some(date))`.
pub fn deserialize_clearable_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_date(deserializer).map(Some)
}

/// Fresh pool on a temporary database file; the `TempDir` must outlive the pool
#[cfg(test)]
pub(crate) async fn test_pool() -> (tempfile::TempDir, sqlx::SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let config = crate::config::DatabaseConfig {
        data_dir: dir.path().to_string_lossy().into_owned(),
    };
    let pool = connect(&config).await.unwrap();
    (dir, pool)
}
