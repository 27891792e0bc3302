//! # grc-database
//!
//! Storage backends for the GRC facade: PostgreSQL through a sqlx pool, a
//! hosted PostgREST-style table API over HTTP, and a process-local
//! in-memory store. Also owns connection management and migrations.

pub mod backends;
pub mod connection;
pub mod migration;

use std::sync::Arc;

use tracing::info;

use grc_core::config::{AppConfig, BackendKind};
use grc_core::result::AppResult;
use grc_core::traits::Backend;

pub use backends::{MemoryBackend, PgBackend, RestBackend};
pub use connection::{APPLICATION_NAME, DatabasePool, mask_password};

/// Build the backend selected by `backend.kind`.
pub async fn connect_backend(config: &AppConfig) -> AppResult<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match config.backend.kind {
        BackendKind::Postgres => {
            let pool =
                DatabasePool::connect(&config.database, Some(config.query.request_timeout()))
                    .await?;
            Arc::new(PgBackend::new(pool.into_pool()))
        }
        BackendKind::Rest => Arc::new(RestBackend::new(
            &config.rest,
            config.query.request_timeout(),
        )?),
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
    };
    info!(backend = backend.name(), "Backend ready");
    Ok(backend)
}
