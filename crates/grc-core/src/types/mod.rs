//! Core type definitions used across the GRC workspace.

pub mod filter;
pub mod pagination;
pub mod search;
pub mod sorting;

pub use filter::FilterInput;
pub use pagination::{Page, PageRequest};
pub use search::SearchRequest;
pub use sorting::{SortDirection, SortField};
