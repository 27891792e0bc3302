//! Control mapping enumerations.

label_enum! {
    /// Review status of a requirement-to-control mapping.
    pub enum MappingStatus {
        /// Suggested, not yet reviewed.
        Proposed => "proposed",
        /// Accepted as evidence for the requirement.
        Approved => "approved",
        /// No longer relied upon.
        Retired => "retired",
    }
}

impl Default for MappingStatus {
    fn default() -> Self {
        Self::Proposed
    }
}

label_enum! {
    /// How much of a requirement a control covers.
    pub enum MappingStrength {
        /// Control fully satisfies the requirement.
        Full => "full",
        /// Control covers part of the requirement.
        Partial => "partial",
        /// Control contributes indirectly.
        Supporting => "supporting",
    }
}

impl Default for MappingStrength {
    fn default() -> Self {
        Self::Full
    }
}
