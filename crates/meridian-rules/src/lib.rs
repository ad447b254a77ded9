//! Daylight saving rule engine for Meridian.
//!
//! Turns a zone's records and rule sets into [`EffectiveSpan`]s: maximal
//! intervals over which one base offset, one DST save and one abbreviation
//! apply. Spans for a query always tile the queried range exactly.
//!
//! # Modules
//!
//! - [`engine`] -- [`RuleEngine`] span resolution.
//! - [`error`] -- Error types for span resolution.
//! - [`nominal`] -- [`NominalTime`], a wall-clock reading not yet tied to an
//!   offset.
//!
//! [`EffectiveSpan`]: meridian_types::EffectiveSpan

pub mod engine;
pub mod error;
pub mod nominal;

// Re-export primary types at crate root.
pub use engine::RuleEngine;
pub use error::RuleError;
pub use nominal::NominalTime;
