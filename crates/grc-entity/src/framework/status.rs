//! Compliance framework status and type enumerations.

label_enum! {
    /// Adoption status of a compliance framework.
    pub enum FrameworkStatus {
        /// Being scoped.
        Draft => "draft",
        /// In use for assessments.
        Active => "active",
        /// No longer pursued.
        Retired => "retired",
    }
}

impl Default for FrameworkStatus {
    fn default() -> Self {
        Self::Draft
    }
}

label_enum! {
    /// Standard or certification program a framework tracks.
    pub enum FrameworkType {
        /// PCI DSS.
        PciDss => "pci_dss",
        /// ISO/IEC 27001 ISMS.
        Iso27001 => "iso_27001",
        /// Cybersecurity Maturity Model Certification.
        Cmmc => "cmmc",
        /// SOC 2.
        Soc2 => "soc2",
        /// NIST Cybersecurity Framework.
        NistCsf => "nist_csf",
        /// HIPAA.
        Hipaa => "hipaa",
        /// GDPR.
        Gdpr => "gdpr",
        /// Organization-specific catalogue.
        Custom => "custom",
    }
}
