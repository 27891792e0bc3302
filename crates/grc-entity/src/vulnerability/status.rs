//! Vulnerability status enumeration.

label_enum! {
    /// Remediation status of a vulnerability.
    pub enum VulnerabilityStatus {
        /// Found, not yet worked on.
        Open => "open",
        /// Remediation under way.
        InProgress => "in_progress",
        /// Fix applied.
        Patched => "patched",
        /// Fix confirmed by a rescan.
        Verified => "verified",
        /// Accepted as residual risk.
        RiskAccepted => "risk_accepted",
        /// Not a real issue.
        FalsePositive => "false_positive",
    }
}

impl VulnerabilityStatus {
    /// Whether the vulnerability is still exposed.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }

    /// Whether a fix has been applied.
    pub fn is_remediated(&self) -> bool {
        matches!(self, Self::Patched | Self::Verified)
    }
}

impl Default for VulnerabilityStatus {
    fn default() -> Self {
        Self::Open
    }
}
