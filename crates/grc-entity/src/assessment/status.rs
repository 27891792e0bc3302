//! Assessment status and type enumerations.

label_enum! {
    /// Lifecycle status of a compliance assessment.
    pub enum AssessmentStatus {
        /// Scheduled, not started.
        Planned => "planned",
        /// Fieldwork underway.
        InProgress => "in_progress",
        /// Finished with a result.
        Completed => "completed",
        /// Called off.
        Cancelled => "cancelled",
    }
}

impl AssessmentStatus {
    /// Whether the assessment has reached a final state.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Default for AssessmentStatus {
    fn default() -> Self {
        Self::Planned
    }
}

label_enum! {
    /// Who performs the assessment and for what purpose.
    pub enum AssessmentType {
        /// Internal audit team.
        Internal => "internal",
        /// Third-party auditor.
        External => "external",
        /// Control owners assess themselves.
        SelfAssessment => "self_assessment",
        /// Certification audit.
        Certification => "certification",
        /// Periodic surveillance audit.
        Surveillance => "surveillance",
    }
}
