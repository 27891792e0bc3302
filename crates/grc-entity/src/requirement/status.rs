//! Requirement status and priority enumerations.

label_enum! {
    /// Assessed compliance status of a requirement.
    pub enum RequirementStatus {
        /// No assessment yet.
        NotAssessed => "not_assessed",
        /// Requirement not met.
        NonCompliant => "non_compliant",
        /// Requirement partly met.
        PartiallyCompliant => "partially_compliant",
        /// Requirement met.
        Compliant => "compliant",
        /// Out of scope.
        NotApplicable => "not_applicable",
    }
}

impl RequirementStatus {
    /// Whether an assessment result has been recorded.
    pub fn is_assessed(&self) -> bool {
        matches!(
            self,
            Self::NonCompliant | Self::PartiallyCompliant | Self::Compliant
        )
    }
}

impl Default for RequirementStatus {
    fn default() -> Self {
        Self::NotAssessed
    }
}

label_enum! {
    /// Remediation priority of a requirement.
    pub enum Priority {
        /// Must be addressed first.
        Critical => "critical",
        /// Address soon.
        High => "high",
        /// Normal planning.
        Medium => "medium",
        /// When convenient.
        Low => "low",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}
