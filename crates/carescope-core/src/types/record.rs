//! Column-keyed row representation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

use super::filter::FilterValue;

/// A row as an ordered map of column name to value.
///
/// Entities convert to and from records for writes and for backends that
/// evaluate predicates without SQL. Missing columns read as `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, FilterValue>);

static NULL: FilterValue = FilterValue::Null;

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FilterValue>) {
        self.0.insert(column.into(), value.into());
    }

    /// Read a column value, `NULL` when absent.
    pub fn get(&self, column: &str) -> &FilterValue {
        self.0.get(column).unwrap_or(&NULL)
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Column names present in this record.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Read a non-null UUID column.
    pub fn uuid(&self, column: &str) -> AppResult<Uuid> {
        self.opt_uuid(column)?.ok_or_else(|| missing(column))
    }

    /// Read a nullable UUID column.
    pub fn opt_uuid(&self, column: &str) -> AppResult<Option<Uuid>> {
        match self.get(column) {
            FilterValue::Null => Ok(None),
            FilterValue::Uuid(id) => Ok(Some(*id)),
            FilterValue::String(s) => Uuid::parse_str(s)
                .map(Some)
                .map_err(|e| mismatch(column, &format!("uuid ({e})"))),
            _ => Err(mismatch(column, "uuid")),
        }
    }

    /// Read a nullable typed identifier column.
    pub fn opt_id<T: From<Uuid>>(&self, column: &str) -> AppResult<Option<T>> {
        Ok(self.opt_uuid(column)?.map(T::from))
    }

    /// Read a non-null typed identifier column.
    pub fn id<T: From<Uuid>>(&self, column: &str) -> AppResult<T> {
        self.uuid(column).map(T::from)
    }

    /// Read a non-null string column.
    pub fn string(&self, column: &str) -> AppResult<String> {
        self.opt_string(column)?.ok_or_else(|| missing(column))
    }

    /// Read a nullable string column.
    pub fn opt_string(&self, column: &str) -> AppResult<Option<String>> {
        match self.get(column) {
            FilterValue::Null => Ok(None),
            FilterValue::String(s) => Ok(Some(s.clone())),
            _ => Err(mismatch(column, "string")),
        }
    }

    /// Read a non-null integer column.
    pub fn integer(&self, column: &str) -> AppResult<i64> {
        match self.get(column) {
            FilterValue::Integer(i) => Ok(*i),
            FilterValue::Null => Err(missing(column)),
            _ => Err(mismatch(column, "integer")),
        }
    }

    /// Read a non-null boolean column.
    pub fn boolean(&self, column: &str) -> AppResult<bool> {
        match self.get(column) {
            FilterValue::Boolean(b) => Ok(*b),
            FilterValue::Null => Err(missing(column)),
            _ => Err(mismatch(column, "boolean")),
        }
    }

    /// Read a non-null timestamp column.
    pub fn timestamp(&self, column: &str) -> AppResult<DateTime<Utc>> {
        self.opt_timestamp(column)?.ok_or_else(|| missing(column))
    }

    /// Read a nullable timestamp column.
    pub fn opt_timestamp(&self, column: &str) -> AppResult<Option<DateTime<Utc>>> {
        match self.get(column) {
            FilterValue::Null => Ok(None),
            FilterValue::Timestamp(t) => Ok(Some(*t)),
            _ => Err(mismatch(column, "timestamp")),
        }
    }
}

fn missing(column: &str) -> AppError {
    AppError::serialization(format!("Column '{column}' is null or missing"))
}

fn mismatch(column: &str, expected: &str) -> AppError {
    AppError::serialization(format!("Column '{column}' is not a {expected}"))
}
