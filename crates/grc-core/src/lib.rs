//! # grc-core
//!
//! Core crate for the GRC entity access facade. Contains the unified error
//! system, configuration schemas, pagination/sorting/search types, the
//! per-entity filter specification, the transport-agnostic query builder
//! and the [`Backend`](traits::Backend) seam every storage implementation
//! plugs into.
//!
//! This crate has **no** internal dependencies on other GRC crates.

pub mod config;
pub mod error;
pub mod query;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
