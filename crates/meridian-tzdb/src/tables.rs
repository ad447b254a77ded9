//! Parsers for the tab-separated geographic tables.
//!
//! - The zone metadata table (`zone1970.tab` layout): country codes, an
//!   ISO 6709 coordinate, the zone name and an optional comment.
//! - The reference-point table: `latitude<TAB>longitude<TAB>zone` in
//!   decimal degrees.

use meridian_types::GeoCoordinate;
use tracing::{debug, warn};

use crate::model::{ReferencePoint, ZoneMetadata};

/// Parse the zone metadata table. Malformed rows are skipped with a
/// diagnostic.
pub fn parse_zone_table(source_name: &str, text: &str) -> Vec<ZoneMetadata> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index.saturating_add(1);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let [codes, coordinate, zone, rest @ ..] = fields.as_slice() else {
            warn!(source = source_name, line = line_number, "zone table row has fewer than three fields");
            continue;
        };
        let Some(coordinate) = parse_iso6709(coordinate) else {
            warn!(
                source = source_name,
                line = line_number,
                coordinate = *coordinate,
                "unparsable coordinate in zone table"
            );
            continue;
        };

        entries.push(ZoneMetadata {
            zone: zone.trim().to_owned(),
            coordinate,
            country_codes: codes
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_owned)
                .collect(),
            comment: rest
                .first()
                .map(|comment| comment.trim())
                .filter(|comment| !comment.is_empty())
                .map(str::to_owned),
        });
    }
    debug!(source = source_name, entries = entries.len(), "parsed zone table");
    entries
}

/// Parse an ISO 6709 sexagesimal pair such as `+4043-07400` or
/// `-332650+1505700` into decimal degrees.
pub fn parse_iso6709(text: &str) -> Option<GeoCoordinate> {
    let text = text.trim();
    let split = text
        .char_indices()
        .skip(1)
        .find(|(_, c)| matches!(c, '+' | '-'))
        .map(|(index, _)| index)?;
    let latitude = parse_sexagesimal(text.get(..split)?, 2)?;
    let longitude = parse_sexagesimal(text.get(split..)?, 3)?;
    Some(GeoCoordinate::new(latitude, longitude))
}

/// `±D..D[MM[SS]]` with a fixed number of degree digits.
fn parse_sexagesimal(text: &str, degree_digits: usize) -> Option<f64> {
    let (sign, digits) = match text.split_at_checked(1)? {
        ("+", digits) => (1.0, digits),
        ("-", digits) => (-1.0, digits),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let degrees: u32 = digits.get(..degree_digits)?.parse().ok()?;
    let rest = digits.get(degree_digits..)?;
    let (minutes, seconds): (u32, u32) = match rest.len() {
        0 => (0, 0),
        2 => (rest.parse().ok()?, 0),
        4 => (rest.get(..2)?.parse().ok()?, rest.get(2..)?.parse().ok()?),
        _ => return None,
    };
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some(sign * (f64::from(degrees) + f64::from(minutes) / 60.0 + f64::from(seconds) / 3600.0))
}

/// Parse the reference-point table.
///
/// Rows must have exactly three tab-separated fields. Lines without any
/// tab (headers, comments) are ignored silently; other bad rows are skipped
/// with a diagnostic.
pub fn parse_reference_points(source_name: &str, text: &str) -> Vec<ReferencePoint> {
    let mut points = Vec::new();
    let mut skipped = 0_usize;
    for (index, line) in text.lines().enumerate() {
        if !line.contains('\t') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let parsed = match fields.as_slice() {
            [latitude, longitude, zone] => parse_point(latitude, longitude, zone),
            _ => None,
        };
        if let Some(point) = parsed {
            points.push(point);
        } else {
            skipped = skipped.saturating_add(1);
            warn!(
                source = source_name,
                line = index.saturating_add(1),
                "skipping malformed reference point"
            );
        }
    }
    debug!(source = source_name, points = points.len(), skipped, "parsed reference points");
    points
}

fn parse_point(latitude: &str, longitude: &str, zone: &str) -> Option<ReferencePoint> {
    let latitude: f64 = latitude.trim().parse().ok()?;
    let longitude: f64 = longitude.trim().parse().ok()?;
    let zone = zone.trim();
    let coordinate = GeoCoordinate::new(latitude, longitude);
    if !coordinate.is_finite() || !(-90.0..=90.0).contains(&latitude) || zone.is_empty() {
        return None;
    }
    Some(ReferencePoint {
        zone: zone.to_owned(),
        coordinate,
    })
}
