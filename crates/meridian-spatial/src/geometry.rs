//! Points and axis-aligned rectangles.
//!
//! Containment is half-open everywhere: inclusive on the minimum edges,
//! exclusive on the maximum edges. A point sitting exactly on a shared edge
//! therefore belongs to exactly one of two adjacent rectangles.

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component (longitude in the resolver).
    pub x: f64,
    /// Vertical component (latitude in the resolver).
    pub y: f64,
}

impl Point {
    /// Create a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return true if both components are finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Straight-line distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle covering `[min.x, max.x) x [min.y, max.y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Inclusive lower corner.
    pub min: Point,
    /// Exclusive upper corner.
    pub max: Point,
}

impl Rect {
    /// Create a rectangle from its two corners.
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min: Point::new(x, y),
            max: Point::new(x + width, y + height),
        }
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Midpoint of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2.0,
            self.min.y + self.height() / 2.0,
        )
    }

    /// Whether the rectangle has positive, finite area.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() > 0.0
    }

    /// Half-open point containment.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.y >= self.min.y && point.x < self.max.x && point.y < self.max.y
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Move `point` inside the rectangle if it lies outside.
    ///
    /// Coordinates below the minimum snap to the minimum edge; coordinates at
    /// or beyond the (exclusive) maximum snap just inside it.
    pub fn clamp_inside(&self, point: Point) -> Point {
        const INSET: f64 = 0.99;
        let x = if point.x < self.min.x {
            self.min.x
        } else if point.x >= self.max.x {
            self.min.x + self.width() * INSET
        } else {
            point.x
        };
        let y = if point.y < self.min.y {
            self.min.y
        } else if point.y >= self.max.y {
            self.min.y + self.height() * INSET
        } else {
            point.y
        };
        Point::new(x, y)
    }
}
