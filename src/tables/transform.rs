//! Row transforms shared by the table definitions

use crate::github::User;
use crate::types::{JsonValue, Row};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Split `owner/repo`; a missing repo part yields an empty string
pub fn parse_repo_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split('/');
    let owner = parts.next().unwrap_or_default().to_string();
    let repo = parts.next().unwrap_or_default().to_string();
    (owner, repo)
}

/// Render a timestamp as RFC 3339 (`2024-01-02T03:04:05Z`)
pub fn timestamp(value: Option<DateTime<Utc>>) -> JsonValue {
    value.map_or(JsonValue::Null, |t| {
        JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Secs, true))
    })
}

/// Like [`timestamp`], but the Unix epoch is treated as unset
pub fn timestamp_non_zero(value: Option<DateTime<Utc>>) -> JsonValue {
    timestamp(value.filter(|t| t.timestamp() != 0))
}

/// Login of an embedded user reference
pub fn login(user: Option<&User>) -> JsonValue {
    user.and_then(|u| u.login.clone()).into()
}

/// Serialize a nested structure into a JSON column
pub fn json_column<T: Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

/// Incrementally builds a [`Row`]
#[derive(Debug, Default)]
pub struct RowBuilder {
    row: Row,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<JsonValue>) -> Self {
        self.row.insert(column.to_string(), value.into());
        self
    }

    pub fn build(self) -> Row {
        self.row
    }
}
