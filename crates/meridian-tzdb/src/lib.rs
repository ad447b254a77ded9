//! IANA tz-source parsing and the zone database model for Meridian.
//!
//! Raw text goes in, a validated read-only [`ZoneDatabase`] comes out. The
//! crate does no file I/O of its own; callers hand it the contents of each
//! source together with a name used in diagnostics.
//!
//! # Modules
//!
//! - [`database`] -- [`ZoneDatabaseBuilder`] and the frozen [`ZoneDatabase`].
//! - [`error`] -- Error types for parsing and validation.
//! - [`fields`] -- Field grammar: days, times, offsets, years, names.
//! - [`model`] -- Zones, rules, links, metadata and reference points.
//! - [`source`] -- Line-level parser for tz source files.
//! - [`tables`] -- Zone metadata and reference-point table parsers.

pub mod database;
pub mod error;
pub mod fields;
pub mod model;
pub mod source;
pub mod tables;

// Re-export primary types at crate root.
pub use database::{SourceStats, ZoneDatabase, ZoneDatabaseBuilder};
pub use error::TzdbError;
pub use model::{
    ClockReference, DayRule, MAX_YEAR, MIN_YEAR, ReferencePoint, RuleRecord, RuleReference,
    RuleSet, TimeOfDay, YearBound, ZoneLink, ZoneMetadata, ZonePeriod, ZoneRecord, ZoneSeries,
};
pub use tables::{parse_iso6709, parse_reference_points, parse_zone_table};
