//! Core traits defined in `grc-core` and implemented by other crates.

pub mod backend;

pub use backend::{Backend, Row};
