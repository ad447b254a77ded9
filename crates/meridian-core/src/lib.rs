//! Resolver for the Meridian time-zone database.
//!
//! Ties the other crates together: reads a tz data directory into a
//! [`ZoneDatabase`](meridian_tzdb::ZoneDatabase), indexes the reference
//! points for coordinate lookup, and answers "what time is it here?" by
//! zone name or by coordinate.
//!
//! # Modules
//!
//! - [`aliases`] -- Windows and legacy zone names mapped to IANA names.
//! - [`config`] -- Configuration loading from `meridian-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Error types for building and querying a resolver.
//! - [`geoindex`] -- Reference points in a quadtree, wrapped at the
//!   antimeridian.
//! - [`loader`] -- Data directory scanning and parsing.
//! - [`mariner`] -- Longitude-derived fallback time.
//! - [`resolver`] -- The [`Resolver`] query surface.

pub mod aliases;
pub mod config;
pub mod error;
pub mod geoindex;
pub mod loader;
pub mod mariner;
pub mod resolver;

// Re-export primary types at crate root.
pub use aliases::ZoneAliases;
pub use config::{ConfigError, ResolverConfig};
pub use error::ResolverError;
pub use resolver::Resolver;
