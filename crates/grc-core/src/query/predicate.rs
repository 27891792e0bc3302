//! Transport-agnostic filter predicates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// Which end of a date range a raw bound belongs to.
///
/// A bare date is widened to cover the whole day: midnight for the start,
/// the last microsecond of the day for the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEdge {
    /// Inclusive lower bound.
    Start,
    /// Inclusive upper bound.
    End,
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS` (taken as
/// UTC) or a `YYYY-MM-DD` date.
pub fn parse_timestamp(raw: &str, edge: RangeEdge) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let naive = match edge {
        RangeEdge::Start => date.and_hms_opt(0, 0, 0)?,
        RangeEdge::End => date.and_hms_micro_opt(23, 59, 59, 999_999)?,
    };
    Some(naive.and_utc())
}

/// A single filter condition, resolved from a declared filter field.
///
/// Column names are always `'static` because they come from an entity's
/// filter specification, never from caller input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// `column` equals one of `values`.
    In {
        /// Column compared.
        column: &'static str,
        /// Accepted values, in caller order.
        values: Vec<String>,
    },
    /// `start <= column <= end`.
    Between {
        /// Timestamp or date column.
        column: &'static str,
        /// Inclusive lower bound.
        start: DateTime<Utc>,
        /// Inclusive upper bound.
        end: DateTime<Utc>,
    },
    /// Any of `columns` contains `needle`, ignoring case.
    AnyContains {
        /// Text columns searched.
        columns: &'static [&'static str],
        /// Substring looked for.
        needle: String,
    },
}

impl Predicate {
    /// Evaluate against a row in memory.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        match self {
            Self::In { column, values } => match row.get(*column).and_then(scalar_text) {
                Some(text) => values.iter().any(|v| *v == text),
                None => false,
            },
            Self::Between { column, start, end } => row
                .get(*column)
                .and_then(Value::as_str)
                .and_then(|raw| parse_timestamp(raw, RangeEdge::Start))
                .is_some_and(|ts| *start <= ts && ts <= *end),
            Self::AnyContains { columns, needle } => {
                let needle = needle.to_lowercase();
                columns.iter().any(|column| {
                    row.get(*column)
                        .and_then(Value::as_str)
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            }
        }
    }

    /// Columns this predicate reads.
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            Self::In { column, .. } | Self::Between { column, .. } => vec![*column],
            Self::AnyContains { columns, .. } => columns.to_vec(),
        }
    }
}

/// Text form of a scalar JSON value; `None` for null, arrays and objects.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
