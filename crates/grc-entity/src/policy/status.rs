//! Policy status and category enumerations.

label_enum! {
    /// Publication lifecycle of a policy document.
    pub enum PolicyStatus {
        /// Being written.
        Draft => "draft",
        /// Awaiting approval.
        UnderReview => "under_review",
        /// Approved, not yet in force.
        Approved => "approved",
        /// In force.
        Published => "published",
        /// Superseded or withdrawn.
        Archived => "archived",
    }
}

impl Default for PolicyStatus {
    fn default() -> Self {
        Self::Draft
    }
}

label_enum! {
    /// Subject area of a policy.
    pub enum PolicyCategory {
        /// Overall information security.
        InformationSecurity => "information_security",
        /// Identity and access management.
        AccessControl => "access_control",
        /// Data handling and privacy.
        DataProtection => "data_protection",
        /// Incident handling.
        IncidentResponse => "incident_response",
        /// Continuity and recovery.
        BusinessContinuity => "business_continuity",
        /// Acceptable use of systems.
        AcceptableUse => "acceptable_use",
        /// Anything else.
        Other => "other",
    }
}
