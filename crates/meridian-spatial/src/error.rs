//! Error types for the `meridian-spatial` crate.

/// Errors that can occur during spatial index operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpatialError {
    /// A coordinate was NaN or infinite and can never be enclosed.
    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate {
        /// Horizontal component.
        x: f64,
        /// Vertical component.
        y: f64,
    },

    /// An initial bound was empty, inverted, or not finite.
    #[error("invalid index bounds: {reason}")]
    InvalidBounds {
        /// Explanation of what is wrong with the bounds.
        reason: String,
    },
}
