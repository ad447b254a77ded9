//! Error types for the `meridian-tzdb` crate.
//!
//! Only problems that make a source unusable surface as [`TzdbError`].
//! Lines the parser cannot make sense of are skipped with a diagnostic
//! instead; see [`crate::source`].

/// Errors that can occur while building a zone database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TzdbError {
    /// A time, offset or date field had content that could not be parsed.
    #[error("{source_name}:{line}: malformed {field} field {value:?}")]
    Format {
        /// Name of the source the line came from.
        source_name: String,
        /// One-based line number.
        line: usize,
        /// Which field was malformed (`UNTIL`, `AT`, `SAVE`, ...).
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// A zone's records do not form a well-ordered series.
    #[error("zone {zone}: {reason}")]
    InvalidSeries {
        /// The zone whose series was rejected.
        zone: String,
        /// Why the series was rejected.
        reason: String,
    },
}
