//! # grc-service
//!
//! The access facade proper: a generic [`EntityRepository`] per entity,
//! the [`Repositories`] registry, request sequencing for list views and
//! the aggregation reducer behind dashboard cards.
//!
//! Every repository receives its backend by injection.

pub mod gate;
pub mod metrics;
pub mod registry;
pub mod repository;

pub use gate::{LatestRequestGate, SearchSession};
pub use metrics::Dashboard;
pub use registry::Repositories;
pub use repository::EntityRepository;
