//! Severity scale shared by incidents and vulnerabilities.

label_enum! {
    /// Impact rating of a security finding or event.
    pub enum Severity {
        /// Immediate, broad impact.
        Critical => "critical",
        /// Significant impact.
        High => "high",
        /// Moderate impact.
        Medium => "medium",
        /// Minor impact.
        Low => "low",
        /// Informational only.
        Info => "info",
    }
}

impl Severity {
    /// Rank used for escalation (higher = more urgent).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Info => 0,
        }
    }

    /// Whether the severity requires escalation.
    pub fn is_urgent(&self) -> bool {
        self.rank() >= Self::High.rank()
    }
}
