//! Control status and type enumerations.

label_enum! {
    /// Implementation status of a security control.
    pub enum ControlStatus {
        /// Not in place.
        NotImplemented => "not_implemented",
        /// Scheduled.
        Planned => "planned",
        /// Partly in place.
        PartiallyImplemented => "partially_implemented",
        /// Fully in place.
        Implemented => "implemented",
        /// Out of scope.
        NotApplicable => "not_applicable",
    }
}

impl Default for ControlStatus {
    fn default() -> Self {
        Self::NotImplemented
    }
}

label_enum! {
    /// Function a control serves.
    pub enum ControlType {
        /// Stops an event from happening.
        Preventive => "preventive",
        /// Notices an event.
        Detective => "detective",
        /// Limits damage after an event.
        Corrective => "corrective",
        /// Discourages an event.
        Deterrent => "deterrent",
        /// Substitutes for a primary control.
        Compensating => "compensating",
    }
}
