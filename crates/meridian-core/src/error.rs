//! Error types for the `meridian-core` crate.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use meridian_rules::RuleError;
use meridian_spatial::SpatialError;
use meridian_tzdb::TzdbError;

/// Errors that can occur while building or querying a [`Resolver`].
///
/// [`Resolver`]: crate::resolver::Resolver
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The data directory does not exist or is not a directory.
    #[error("data directory not found: {}", path.display())]
    MissingDirectory {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The mandatory zone metadata table is missing.
    #[error("zone metadata table not found: {}", path.display())]
    MissingMetadata {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A data file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file or directory being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A tz source file failed to parse.
    #[error("zone database error: {0}")]
    Tzdb(#[from] TzdbError),

    /// The reference-point index rejected an insertion.
    #[error("spatial index error: {0}")]
    Spatial(#[from] SpatialError),

    /// Span resolution failed.
    #[error("rule engine error: {0}")]
    Rules(#[from] RuleError),

    /// The spans computed for a zone do not cover the queried instant.
    #[error("no effective span of zone {zone} covers {instant}")]
    Coverage {
        /// Zone being queried.
        zone: String,
        /// The instant that fell outside every span.
        instant: DateTime<Utc>,
    },
}
