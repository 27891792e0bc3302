//! # grc-entity
//!
//! Domain entities of the GRC facade: record models, create/update payloads,
//! status enumerations, per-entity filter declarations and the status side
//! effect tables the generic repository applies.

#[macro_use]
mod macros;

pub mod assessment;
pub mod control;
pub mod entity;
pub mod framework;
pub mod incident;
pub mod mapping;
pub mod policy;
pub mod requirement;
pub mod severity;
pub mod vulnerability;

pub use assessment::Assessment;
pub use control::Control;
pub use entity::{Entity, Label, StatusTransition};
pub use framework::ComplianceFramework;
pub use incident::Incident;
pub use mapping::ControlMapping;
pub use policy::Policy;
pub use requirement::Requirement;
pub use severity::Severity;
pub use vulnerability::Vulnerability;
