//! Error types for the `meridian` binary.

use meridian_core::{ConfigError, ResolverError};

/// Errors that end a `meridian` invocation.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The command line could not be understood.
    #[error("{0}\n\n{usage}", usage = crate::command::USAGE)]
    Usage(String),

    /// An instant argument was not RFC 3339.
    #[error("invalid instant {value:?}: {source}")]
    InvalidInstant {
        /// The argument as given.
        value: String,
        /// The underlying parse error.
        source: chrono::ParseError,
    },

    /// A latitude or longitude argument was not a number.
    #[error("invalid coordinate {value:?}: {source}")]
    InvalidCoordinate {
        /// The argument as given.
        value: String,
        /// The underlying parse error.
        source: std::num::ParseFloatError,
    },

    /// The zone name does not resolve to a zone.
    #[error("unknown zone: {0}")]
    UnknownZone(String),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The resolver failed to build or to answer.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
