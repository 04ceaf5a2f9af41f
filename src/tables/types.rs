//! Table metadata and query types

use crate::error::{Error, Result};
use crate::fetch::IgnorePredicate;
use crate::types::JsonValue;
use serde::Serialize;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Columns
// ============================================================================

/// Value type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Bool,
    /// RFC 3339 string
    Timestamp,
    Json,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Bool => "bool",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

/// A column exposed by a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub description: &'static str,
}

impl Column {
    pub const fn new(name: &'static str, column_type: ColumnType, description: &'static str) -> Self {
        Self {
            name,
            column_type,
            description,
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// Static description of a table
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub name: &'static str,
    pub description: &'static str,
    pub columns: Vec<Column>,
    /// Quals required to list rows
    pub list_keys: Vec<&'static str>,
    /// Quals required to get a single row
    pub get_keys: Vec<&'static str>,
    /// Errors meaning "no rows" when listing
    #[serde(skip)]
    pub list_ignore: Option<IgnorePredicate>,
    /// Errors meaning "no row" when getting
    #[serde(skip)]
    pub get_ignore: Option<IgnorePredicate>,
}

impl Table {
    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

// ============================================================================
// Query
// ============================================================================

/// Qualifiers and limits for one table query
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Equality qualifiers keyed by column name
    pub quals: HashMap<String, JsonValue>,
    /// Maximum number of rows wanted
    pub limit: Option<u64>,
    /// Fires when the caller stops consuming rows
    pub cancel: CancellationToken,
}

impl Query {
    /// Create an unqualified, unbounded query
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a qualifier
    #[must_use]
    pub fn qual(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.quals.insert(column.into(), value.into());
        self
    }

    /// Set the row limit
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Tie the query to an external cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// String value of a required qualifier
    pub fn string_qual(&self, table: &str, column: &str) -> Result<String> {
        match self.quals.get(column) {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(JsonValue::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(Error::invalid_value(
                column,
                format!("expected a string for {table}.{column}, got {other}"),
            )),
            None => Err(Error::missing_qual(table, column)),
        }
    }

    /// Integer value of a required qualifier; numeric strings are accepted
    pub fn int_qual(&self, table: &str, column: &str) -> Result<i64> {
        let parsed = match self.quals.get(column) {
            Some(JsonValue::Number(n)) => n.as_i64(),
            Some(JsonValue::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
            None => return Err(Error::missing_qual(table, column)),
        };
        parsed.ok_or_else(|| {
            Error::invalid_value(column, format!("expected an integer for {table}.{column}"))
        })
    }
}
