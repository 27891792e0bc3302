//! One repository per entity, all sharing one backend.

use std::sync::Arc;

use grc_core::config::QueryConfig;
use grc_core::traits::Backend;
use grc_entity::{
    Assessment, ComplianceFramework, Control, ControlMapping, Incident, Policy, Requirement,
    Vulnerability,
};

use crate::repository::EntityRepository;

/// Every entity repository of the facade.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Security incidents.
    pub incidents: EntityRepository<Incident>,
    /// Vulnerabilities.
    pub vulnerabilities: EntityRepository<Vulnerability>,
    /// Policies.
    pub policies: EntityRepository<Policy>,
    /// Controls.
    pub controls: EntityRepository<Control>,
    /// Compliance frameworks.
    pub frameworks: EntityRepository<ComplianceFramework>,
    /// Framework requirements.
    pub requirements: EntityRepository<Requirement>,
    /// Requirement-to-control mappings.
    pub mappings: EntityRepository<ControlMapping>,
    /// Assessments.
    pub assessments: EntityRepository<Assessment>,
}

impl Repositories {
    /// Build every repository over `backend`.
    pub fn new(backend: Arc<dyn Backend>, config: &QueryConfig) -> Self {
        Self {
            incidents: EntityRepository::new(Arc::clone(&backend), config),
            vulnerabilities: EntityRepository::new(Arc::clone(&backend), config),
            policies: EntityRepository::new(Arc::clone(&backend), config),
            controls: EntityRepository::new(Arc::clone(&backend), config),
            frameworks: EntityRepository::new(Arc::clone(&backend), config),
            requirements: EntityRepository::new(Arc::clone(&backend), config),
            mappings: EntityRepository::new(Arc::clone(&backend), config),
            assessments: EntityRepository::new(backend, config),
        }
    }
}
