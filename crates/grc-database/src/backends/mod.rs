//! [`Backend`](grc_core::traits::Backend) implementations.

pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;
pub use rest::RestBackend;
