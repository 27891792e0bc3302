//! Raw filter values as they arrive from a list view or the CLI.

use serde::{Deserialize, Serialize};

/// The caller-supplied value for one filter field.
///
/// Nothing here is trusted: the entity's
/// [`FilterSpec`](crate::query::FilterSpec) decides whether it becomes a
/// predicate or is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterInput {
    /// A set of accepted values (`["high", "critical"]`).
    Values(Vec<String>),
    /// An inclusive date range; both ends are RFC 3339 timestamps or
    /// `YYYY-MM-DD` dates.
    Range {
        /// Lower bound.
        start: String,
        /// Upper bound.
        end: String,
    },
}

impl FilterInput {
    /// Shorthand for a value list.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    /// Shorthand for a date range.
    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Range {
            start: start.into(),
            end: end.into(),
        }
    }
}
