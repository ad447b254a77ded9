//! Spatial indexing for the Meridian time-zone database.
//!
//! This crate knows nothing about time zones. It offers a generic
//! [`DynamicQuadtree`] that maps keyed items to 2D points, grows to enclose
//! whatever it is given, and answers exact rectangle queries plus a
//! "somewhere near here" candidate query suitable for a follow-up exact
//! distance scan.
//!
//! # Modules
//!
//! - [`error`] -- Error types for index operations.
//! - [`geometry`] -- [`Point`] and [`Rect`] with half-open containment.
//! - [`quadtree`] -- The arena-backed [`DynamicQuadtree`].

pub mod error;
pub mod geometry;
pub mod quadtree;

// Re-export primary types at crate root.
pub use error::SpatialError;
pub use geometry::{Point, Rect};
pub use quadtree::DynamicQuadtree;
