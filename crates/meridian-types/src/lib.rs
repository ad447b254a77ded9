//! Shared value types for the Meridian time-zone database.
//!
//! Everything that crosses a crate boundary in the workspace lives here:
//! coordinates, offsets, the effective spans produced by the rule engine,
//! and the query results handed back by the resolver.
//!
//! # Modules
//!
//! - [`geo`] -- [`GeoCoordinate`] and great-circle distance.
//! - [`offset`] -- Minute rounding and clipping of UTC offsets, plus a serde
//!   adapter for [`chrono::TimeDelta`].
//! - [`span`] -- [`EffectiveSpan`], one fixed offset/DST/abbreviation interval.
//! - [`query`] -- [`QueryResult`], the answer to "what time is it here?".

pub mod geo;
pub mod offset;
pub mod query;
pub mod span;

// Re-export primary types at crate root.
pub use geo::GeoCoordinate;
pub use offset::{MAX_OFFSET, round_to_minute, to_fixed_offset};
pub use query::QueryResult;
pub use span::{EffectiveSpan, spans_tile_range};
