//! Mariner's time: a rule-free zone derived from longitude alone.
//!
//! Used for coordinates too far from every reference point to belong to a
//! real zone, such as the open ocean.

use chrono::{DateTime, TimeDelta, Utc};
use meridian_types::{GeoCoordinate, QueryResult, to_fixed_offset};

/// Largest offset, in whole hours, mariner's time can produce.
const MAX_HOURS: f64 = 14.0;

/// Whole-hour offset for `longitude`: one hour per 15 degrees, ties to the
/// even hour, clamped to ±14.
#[allow(clippy::cast_possible_truncation)]
pub fn mariner_offset_hours(longitude: f64) -> i64 {
    let hours = (longitude * 24.0 / 360.0).round_ties_even();
    if !hours.is_finite() {
        return 0;
    }
    hours.clamp(-MAX_HOURS, MAX_HOURS) as i64
}

/// `GMT` for zero, otherwise `GMT+N` or `GMT-N`.
pub fn mariner_zone_name(hours: i64) -> String {
    match hours {
        0 => "GMT".to_owned(),
        h if h > 0 => format!("GMT+{h}"),
        h => format!("GMT{h}"),
    }
}

/// Local time at `coordinate` under mariner's time.
///
/// There is no DST; the query coordinate doubles as the reference
/// coordinate.
pub fn mariners_time(coordinate: GeoCoordinate, utc: DateTime<Utc>) -> QueryResult {
    let hours = mariner_offset_hours(coordinate.longitude);
    let offset = TimeDelta::try_hours(hours).unwrap_or_default();
    let name = mariner_zone_name(hours);
    QueryResult {
        local_time: utc.with_timezone(&to_fixed_offset(offset)),
        gmt_offset: offset,
        dst_offset: TimeDelta::zero(),
        zone_name: name.clone(),
        abbreviation: name,
        query_coordinate: Some(coordinate),
        reference_coordinate: Some(coordinate),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn offset_follows_longitude() {
        assert_eq!(mariner_offset_hours(0.0), 0);
        assert_eq!(mariner_offset_hours(-150.0), -10);
        assert_eq!(mariner_offset_hours(44.0), 3);
        assert_eq!(mariner_offset_hours(-7.4), 0);
        assert_eq!(mariner_offset_hours(179.9), 12);
    }

    #[test]
    fn halfway_rounds_to_even() {
        assert_eq!(mariner_offset_hours(112.5), 8);
        assert_eq!(mariner_offset_hours(-7.5), 0);
        assert_eq!(mariner_offset_hours(22.5), 2);
    }

    #[test]
    fn offset_is_clamped() {
        assert_eq!(mariner_offset_hours(300.0), 14);
        assert_eq!(mariner_offset_hours(-300.0), -14);
        assert_eq!(mariner_offset_hours(f64::NAN), 0);
    }

    #[test]
    fn names() {
        assert_eq!(mariner_zone_name(0), "GMT");
        assert_eq!(mariner_zone_name(5), "GMT+5");
        assert_eq!(mariner_zone_name(-10), "GMT-10");
    }

    #[test]
    fn result_fields() {
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap_or_default();
        let coordinate = GeoCoordinate::new(-40.0, -150.0);
        let result = mariners_time(coordinate, utc);
        assert_eq!(result.zone_name, "GMT-10");
        assert_eq!(result.abbreviation, "GMT-10");
        assert_eq!(result.gmt_offset, TimeDelta::hours(-10));
        assert_eq!(result.dst_offset, TimeDelta::zero());
        assert_eq!(result.local_time.to_rfc3339(), "2024-06-01T02:00:00-10:00");
        assert_eq!(result.query_coordinate, Some(coordinate));
        assert_eq!(result.reference_coordinate, Some(coordinate));
    }
}
