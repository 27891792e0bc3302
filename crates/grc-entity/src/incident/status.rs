//! Incident status and category enumerations.

label_enum! {
    /// Lifecycle status of a security incident.
    pub enum IncidentStatus {
        /// Reported, not yet triaged.
        Open => "open",
        /// Under investigation.
        Investigating => "investigating",
        /// Spread stopped, remediation pending.
        Contained => "contained",
        /// Remediated.
        Resolved => "resolved",
        /// Reviewed and closed.
        Closed => "closed",
    }
}

impl IncidentStatus {
    /// Whether the incident still needs work.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Investigating | Self::Contained)
    }
}

impl Default for IncidentStatus {
    fn default() -> Self {
        Self::Open
    }
}

label_enum! {
    /// Kind of security incident.
    pub enum IncidentCategory {
        /// Malicious software.
        Malware => "malware",
        /// Credential or payment phishing.
        Phishing => "phishing",
        /// Confirmed disclosure of protected data.
        DataBreach => "data_breach",
        /// Access without authorization.
        UnauthorizedAccess => "unauthorized_access",
        /// Availability attack.
        DenialOfService => "denial_of_service",
        /// Misuse by a trusted party.
        InsiderThreat => "insider_threat",
        /// Breach of an internal policy.
        PolicyViolation => "policy_violation",
        /// Anything else.
        Other => "other",
    }
}
