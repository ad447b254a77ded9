//! Reference points indexed by (longitude, latitude).
//!
//! Points close to the antimeridian are indexed twice, once at their own
//! longitude and once shifted by 360 degrees, so a query just across the
//! date line still finds them as candidates.

use meridian_spatial::{DynamicQuadtree, Point, Rect};
use meridian_tzdb::ReferencePoint;
use meridian_types::GeoCoordinate;
use tracing::{debug, warn};

use crate::error::ResolverError;

/// Key of one indexed copy of a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceKey {
    /// Position in the reference-point list.
    pub index: usize,
    /// Whether this copy is the one shifted across the antimeridian.
    pub wrapped: bool,
}

/// Spatial index over a fixed list of reference points.
#[derive(Debug)]
pub struct ReferenceIndex {
    tree: DynamicQuadtree<ReferenceKey>,
    points: Vec<ReferencePoint>,
}

impl ReferenceIndex {
    /// Index `points`, duplicating those within `wrap_margin` degrees of the
    /// antimeridian. Points with non-finite coordinates are left out.
    ///
    /// # Errors
    ///
    /// [`ResolverError::Spatial`] if the index rejects its initial bounds.
    pub fn build(points: Vec<ReferencePoint>, wrap_margin: f64) -> Result<Self, ResolverError> {
        let mut tree = DynamicQuadtree::with_bounds(Rect::from_origin_size(-180.0, -90.0, 360.0, 180.0))?;
        let east_edge = 180.0 - wrap_margin;
        let mut wrapped = 0_usize;

        for (index, point) in points.iter().enumerate() {
            let GeoCoordinate { latitude, longitude } = point.coordinate;
            if !point.coordinate.is_finite() {
                warn!(zone = %point.zone, "skipping reference point with non-finite coordinate");
                continue;
            }
            tree.insert(ReferenceKey { index, wrapped: false }, Point::new(longitude, latitude))?;

            let shifted = if longitude < -east_edge {
                Some(longitude + 360.0)
            } else if longitude > east_edge {
                Some(longitude - 360.0)
            } else {
                None
            };
            if let Some(shifted) = shifted {
                tree.insert(ReferenceKey { index, wrapped: true }, Point::new(shifted, latitude))?;
                wrapped = wrapped.saturating_add(1);
            }
        }

        debug!(points = points.len(), wrapped, nodes = tree.node_count(), "reference index built");
        Ok(Self { tree, points })
    }

    /// Number of reference points (wrapped copies not counted).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no reference points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The reference point closest to `coordinate` by great-circle distance,
    /// with that distance in kilometres.
    ///
    /// Only candidates returned by the index's neighbourhood query are
    /// considered, so the answer is the nearest local point rather than a
    /// guaranteed global minimum.
    pub fn nearest(&self, coordinate: GeoCoordinate) -> Option<(&ReferencePoint, f64)> {
        if !coordinate.is_finite() || self.tree.is_empty() {
            return None;
        }
        self.tree
            .items_near(Point::new(coordinate.longitude, coordinate.latitude))
            .into_iter()
            .filter_map(|(key, _)| self.points.get(key.index))
            .map(|point| (point, point.coordinate.distance_km(coordinate)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
