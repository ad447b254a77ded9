//! Error types for the `meridian-rules` crate.

use chrono::{DateTime, Utc};

/// Errors that can occur while computing effective spans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// No zone series exists under this exact name.
    #[error("unknown zone: {0}")]
    UnknownZone(String),

    /// A rule transition could not be represented as an instant.
    #[error("date arithmetic out of range for zone {zone} near {near}")]
    DateOutOfRange {
        /// Zone being evaluated.
        zone: String,
        /// Start of the range being evaluated when the overflow happened.
        near: DateTime<Utc>,
    },
}
