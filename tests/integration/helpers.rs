//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use grc_core::config::QueryConfig;
use grc_database::MemoryBackend;
use grc_entity::Vulnerability;
use grc_entity::framework::{CreateFramework, FrameworkStatus, FrameworkType};
use grc_entity::requirement::{CreateRequirement, Priority, RequirementStatus};
use grc_entity::severity::Severity;
use grc_entity::vulnerability::{CreateVulnerability, VulnerabilityStatus};
use grc_entity::ComplianceFramework;
use grc_service::Repositories;

/// Test application context
pub struct TestApp {
    /// In-memory backend shared by every repository
    pub backend: Arc<MemoryBackend>,
    /// Repository registry over the backend
    pub repos: Repositories,
    /// Query bounds the repositories were built with
    pub config: QueryConfig,
}

impl TestApp {
    /// Create a new test application over an empty in-memory backend
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    /// Create a test application with custom query bounds
    pub fn with_config(config: QueryConfig) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let repos = Repositories::new(backend.clone(), &config);
        Self {
            backend,
            repos,
            config,
        }
    }

    /// Record a vulnerability
    pub async fn create_vulnerability(
        &self,
        title: &str,
        severity: Severity,
        status: VulnerabilityStatus,
    ) -> Vulnerability {
        self.repos
            .vulnerabilities
            .create(&vulnerability(title, severity, status))
            .await
            .expect("Failed to create vulnerability")
    }

    /// Seed the triage scenario: 25 vulnerabilities, 12 of them high or
    /// critical, 3 of those mentioning SQL. Two lower-severity records
    /// mention SQL as well.
    pub async fn seed_triage_backlog(&self) {
        let urgent = [
            ("SQL injection in login form", Severity::Critical),
            ("Blind SQL injection in reports API", Severity::High),
            ("Stored XSS in comments", Severity::High),
            ("Remote code execution in image parser", Severity::Critical),
            ("Outdated OpenSSL on edge proxy", Severity::High),
            ("Hard-coded credentials in build script", Severity::Critical),
            ("Second-order sql injection in search", Severity::High),
            ("SSRF in webhook validator", Severity::High),
            ("Path traversal in file export", Severity::High),
            ("Deserialization flaw in job runner", Severity::Critical),
            ("Privilege escalation via sudoers", Severity::High),
            ("Unauthenticated admin endpoint", Severity::Critical),
        ];
        for (title, severity) in urgent {
            self.create_vulnerability(title, severity, VulnerabilityStatus::Open)
                .await;
        }

        let routine = [
            ("Verbose SQL errors on 404 page", Severity::Medium),
            ("MySQL banner disclosure", Severity::Low),
        ];
        for (title, severity) in routine {
            self.create_vulnerability(title, severity, VulnerabilityStatus::Open)
                .await;
        }
        for n in 0..11 {
            let severity = if n % 2 == 0 { Severity::Medium } else { Severity::Low };
            self.create_vulnerability(
                &format!("Missing security header #{n}"),
                severity,
                VulnerabilityStatus::InProgress,
            )
            .await;
        }
    }

    /// Add a framework
    pub async fn create_framework(
        &self,
        code: &str,
        status: FrameworkStatus,
        score: Option<f64>,
    ) -> ComplianceFramework {
        self.repos
            .frameworks
            .create(&CreateFramework {
                code: code.to_string(),
                name: format!("{code} framework"),
                version: None,
                description: None,
                framework_type: FrameworkType::Custom,
                status,
                compliance_score: score,
                certification_level: None,
                target_date: None,
            })
            .await
            .expect("Failed to create framework")
    }

    /// Add a requirement to a framework
    pub async fn create_requirement(
        &self,
        framework: &ComplianceFramework,
        code: &str,
        status: RequirementStatus,
    ) {
        self.repos
            .requirements
            .create(&CreateRequirement {
                framework_id: framework.id,
                requirement_code: code.to_string(),
                title: format!("Requirement {code}"),
                description: None,
                section: None,
                priority: Priority::default(),
                status,
            })
            .await
            .expect("Failed to create requirement");
    }
}

/// Payload for a new open vulnerability
pub fn vulnerability(
    title: &str,
    severity: Severity,
    status: VulnerabilityStatus,
) -> CreateVulnerability {
    CreateVulnerability {
        title: title.to_string(),
        description: None,
        severity,
        status,
        cve_id: None,
        cvss_score: None,
        affected_asset: None,
        discovered_date: None,
        due_date: None,
    }
}
