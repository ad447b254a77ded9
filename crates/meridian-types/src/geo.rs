//! Geographic coordinates and great-circle distance.
//!
//! Distances use the haversine formula on a sphere with the WGS84
//! equatorial radius. Longitudes are compared modulo the antimeridian, so a
//! point at `179.9` and a point at `-179.9` are a few kilometres apart.

use serde::{Deserialize, Serialize};

/// Equatorial radius of the earth in kilometres.
const EARTH_RADIUS_KM: f64 = 6378.137;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Degrees north of the equator (negative for south).
    pub latitude: f64,
    /// Degrees east of Greenwich (negative for west).
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a coordinate from latitude and longitude in decimal degrees.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Return true if both components are finite numbers.
    pub const fn is_finite(self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(self, other: Self) -> f64 {
        let mut a_lon = self.longitude;
        let mut b_lon = other.longitude;

        // Bring both longitudes onto the same side of the antimeridian.
        if b_lon - a_lon > 180.0 {
            a_lon += 360.0;
        } else if a_lon - b_lon > 180.0 {
            b_lon += 360.0;
        }

        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (b_lon - a_lon).to_radians();
        let half_chord = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
        EARTH_RADIUS_KM * angle
    }
}

impl core::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}
