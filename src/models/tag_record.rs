use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};
use crate::utils::time::from_timestamp_nanos;

/// Separator between name and tag in a composite key such as `app:v1`.
pub const KEY_SEPARATOR: char = ':';

/// A stored record. Timestamps are Unix epoch nanoseconds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
    pub tag: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Wire shape of a record. `id` and `created_at` are never exposed.
#[derive(Debug, Serialize)]
pub struct TagRecordResponse {
    pub name: String,
    pub tag: String,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<TagRecord> for TagRecordResponse {
    fn from(record: TagRecord) -> Self {
        TagRecordResponse {
            name: record.name,
            tag: record.tag,
            updated_at: from_timestamp_nanos(record.updated_at),
        }
    }
}

/// A parsed `name:tag` write key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagKey {
    pub name: String,
    pub tag: String,
}

impl TagKey {
    /// Parses a write key. Exactly one separator is required and neither side may be empty.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let mut parts = raw.split(KEY_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(tag), None) if !name.is_empty() && !tag.is_empty() => Ok(TagKey {
                name: name.to_string(),
                tag: tag.to_string(),
            }),
            _ => Err(AppError::BadRequest("format error".to_string())),
        }
    }

    /// Name used by reads: everything before the first separator, the rest is dropped.
    /// `app:v1` and `app` both read `app`.
    pub fn read_name(raw: &str) -> AppResult<&str> {
        let name = raw.split(KEY_SEPARATOR).next().unwrap_or_default();
        if name.is_empty() {
            return Err(AppError::BadRequest("format error".to_string()));
        }
        Ok(name)
    }
}

impl std::fmt::Display for TagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.name, KEY_SEPARATOR, self.tag)
    }
}

/// How many records a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unbounded,
    AtMost(u32),
}

impl Limit {
    /// Positive counts cap the result, zero and negative counts mean no cap.
    pub fn from_count(count: i64) -> Self {
        if count > 0 {
            Limit::AtMost(u32::try_from(count).unwrap_or(u32::MAX))
        } else {
            Limit::Unbounded
        }
    }

    /// Parses the optional `limit` query value. Absent means unbounded,
    /// anything that is not an integer is rejected.
    pub fn parse_query(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Limit::Unbounded),
            Some(value) => value
                .parse::<i64>()
                .map(Limit::from_count)
                .map_err(|_| AppError::BadRequest(format!("invalid limit: {}", value))),
        }
    }

    /// Value for a sqlite `LIMIT` clause, where a negative limit means no limit.
    pub fn as_sql(self) -> i64 {
        match self {
            Limit::Unbounded => -1,
            Limit::AtMost(n) => i64::from(n),
        }
    }
}
