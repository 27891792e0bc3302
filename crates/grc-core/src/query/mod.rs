//! Filter specifications, predicates and query planning.

pub mod builder;
pub mod predicate;
pub mod spec;

pub use builder::{QueryBuilder, QueryPlan};
pub use predicate::{Predicate, RangeEdge, parse_timestamp};
pub use spec::{FilterField, FilterKind, FilterSpec, Resolution};
