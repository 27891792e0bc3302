//! Declarative filter specifications.
//!
//! Each entity declares, once and statically, which logical fields may be
//! filtered, which text columns free-text search covers and which columns
//! may be sorted on. Raw caller input is resolved against that declaration;
//! anything it does not cover is rejected instead of being forwarded to the
//! backend.

use tracing::warn;
use uuid::Uuid;

use super::predicate::{Predicate, RangeEdge, parse_timestamp};
use crate::types::filter::FilterInput;

/// How a filter field interprets its raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Exactly one value from the allowed set.
    Enum,
    /// One or more values from the allowed set.
    MultiEnum,
    /// One or more record identifiers (UUIDs) of a related entity.
    Reference,
    /// An inclusive `{start, end}` date range.
    DateRange,
}

/// One filterable field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Logical name used in search requests.
    pub name: &'static str,
    /// Backend column the predicate applies to.
    pub column: &'static str,
    /// How the raw value is interpreted.
    pub kind: FilterKind,
    /// Accepted values for enum kinds; empty otherwise.
    pub allowed: &'static [&'static str],
}

impl FilterField {
    /// A single-value enum field whose column shares its name.
    pub const fn single(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            column: name,
            kind: FilterKind::Enum,
            allowed,
        }
    }

    /// A multi-value enum field whose column shares its name.
    pub const fn multi(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            column: name,
            kind: FilterKind::MultiEnum,
            allowed,
        }
    }

    /// A reference field holding related record ids.
    pub const fn reference(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            kind: FilterKind::Reference,
            allowed: &[],
        }
    }

    /// A date-range field whose column shares its name.
    pub const fn date_range(name: &'static str) -> Self {
        Self {
            name,
            column: name,
            kind: FilterKind::DateRange,
            allowed: &[],
        }
    }

    /// Same field under a different column name.
    pub const fn on_column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }
}

/// Outcome of resolving one raw filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The value is acceptable; apply this predicate.
    Predicate(Predicate),
    /// The value is not acceptable, with the reason shown to the caller.
    Rejected(String),
}

impl Resolution {
    fn rejected(entity: &str, field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(entity, field, reason = %reason, "Rejected filter value");
        Self::Rejected(reason)
    }
}

/// The complete filter declaration of one entity.
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    /// Entity name, for logs and messages.
    pub entity: &'static str,
    /// Declared filter fields.
    pub fields: &'static [FilterField],
    /// Text columns covered by free-text search.
    pub search_columns: &'static [&'static str],
    /// Columns a request may sort on. `id` and `created_at` are always
    /// sortable.
    pub sortable: &'static [&'static str],
}

impl FilterSpec {
    /// Look up a declared field by logical name.
    pub fn field(&self, name: &str) -> Option<&'static FilterField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `column` may be used as a sort key; returns the static name.
    pub fn sort_column(&self, column: &str) -> Option<&'static str> {
        ["id", "created_at"]
            .into_iter()
            .chain(self.sortable.iter().copied())
            .find(|c| *c == column)
    }

    /// Resolve a raw value for `name` into a predicate or a rejection.
    pub fn resolve(&self, name: &str, raw: &FilterInput) -> Resolution {
        let Some(field) = self.field(name) else {
            return Resolution::rejected(
                self.entity,
                name,
                format!("'{name}' is not a filterable field of {}", self.entity),
            );
        };

        match (field.kind, raw) {
            (FilterKind::Enum | FilterKind::MultiEnum, FilterInput::Values(values)) => {
                self.resolve_enum(field, values)
            }
            (FilterKind::Reference, FilterInput::Values(values)) => {
                self.resolve_reference(field, values)
            }
            (FilterKind::DateRange, FilterInput::Range { start, end }) => {
                self.resolve_range(field, start, end)
            }
            (FilterKind::DateRange, FilterInput::Values(_)) => Resolution::rejected(
                self.entity,
                name,
                format!("'{name}' expects a {{start, end}} date range"),
            ),
            (_, FilterInput::Range { .. }) => Resolution::rejected(
                self.entity,
                name,
                format!("'{name}' expects a list of values"),
            ),
        }
    }

    /// Compile free text into an OR of case-insensitive contains
    /// predicates. Blank text (or an entity without text columns)
    /// yields nothing.
    pub fn search(&self, text: &str) -> Option<Predicate> {
        let needle = text.trim();
        if needle.is_empty() || self.search_columns.is_empty() {
            return None;
        }
        Some(Predicate::AnyContains {
            columns: self.search_columns,
            needle: needle.to_string(),
        })
    }

    fn resolve_enum(&self, field: &FilterField, values: &[String]) -> Resolution {
        if values.is_empty() {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!("'{}' requires at least one value", field.name),
            );
        }
        if field.kind == FilterKind::Enum && values.len() > 1 {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!("'{}' accepts exactly one value", field.name),
            );
        }
        if let Some(bad) = values.iter().find(|v| !field.allowed.contains(&v.as_str())) {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!(
                    "'{bad}' is not an allowed value for '{}' (allowed: {})",
                    field.name,
                    field.allowed.join(", ")
                ),
            );
        }
        let mut deduped: Vec<String> = Vec::with_capacity(values.len());
        for v in values {
            if !deduped.contains(v) {
                deduped.push(v.clone());
            }
        }
        Resolution::Predicate(Predicate::In {
            column: field.column,
            values: deduped,
        })
    }

    fn resolve_reference(&self, field: &FilterField, values: &[String]) -> Resolution {
        if values.is_empty() {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!("'{}' requires at least one id", field.name),
            );
        }
        let mut ids = Vec::with_capacity(values.len());
        for raw in values {
            match Uuid::parse_str(raw.trim()) {
                Ok(id) => ids.push(id.to_string()),
                Err(_) => {
                    return Resolution::rejected(
                        self.entity,
                        field.name,
                        format!("'{raw}' is not a valid id for '{}'", field.name),
                    );
                }
            }
        }
        Resolution::Predicate(Predicate::In {
            column: field.column,
            values: ids,
        })
    }

    fn resolve_range(&self, field: &FilterField, start: &str, end: &str) -> Resolution {
        let Some(start_ts) = parse_timestamp(start, RangeEdge::Start) else {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!("'{start}' is not a valid start date for '{}'", field.name),
            );
        };
        let Some(end_ts) = parse_timestamp(end, RangeEdge::End) else {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!("'{end}' is not a valid end date for '{}'", field.name),
            );
        };
        if start_ts > end_ts {
            return Resolution::rejected(
                self.entity,
                field.name,
                format!("'{}' range start {start} is after end {end}", field.name),
            );
        }
        Resolution::Predicate(Predicate::Between {
            column: field.column,
            start: start_ts,
            end: end_ts,
        })
    }
}
