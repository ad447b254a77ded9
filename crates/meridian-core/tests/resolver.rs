//! Integration tests for the `meridian-core` resolver.
//!
//! Every test builds a resolver from the small tz data sets under
//! `tests/fixtures/` and queries it the way an embedding application would.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use meridian_core::config::DataConfig;
use meridian_core::{Resolver, ResolverConfig, ResolverError, ZoneAliases};
use meridian_types::{GeoCoordinate, spans_tile_range};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn resolver() -> Resolver {
    Resolver::initialize(&fixture("tzdata")).expect("fixture data should load")
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn builds_from_fixture_directory() {
    let resolver = resolver();
    let db = resolver.database();
    assert_eq!(db.zone_count(), 5);
    assert_eq!(db.link_count(), 4);
    assert_eq!(db.metadata_entries().count(), 5);
    assert_eq!(resolver.reference_point_count(), 9);
    assert!(!resolver.is_degraded());
    // `garbled` is not UTF-8 and contributes nothing.
    assert!(db.zone("Test/Garbled").is_none());
}

#[test]
fn missing_directory_fails() {
    let result = Resolver::initialize(&fixture("does-not-exist"));
    assert!(matches!(result, Err(ResolverError::MissingDirectory { .. })));
}

#[test]
fn missing_metadata_fails() {
    let config = ResolverConfig {
        data: DataConfig {
            directory: fixture("tzdata"),
            metadata_file: "missing.tab".to_owned(),
            ..DataConfig::default()
        },
        ..ResolverConfig::default()
    };
    let result = Resolver::from_config(&config);
    assert!(matches!(result, Err(ResolverError::MissingMetadata { .. })));
}

#[test]
fn malformed_until_fails_the_build() {
    let result = Resolver::initialize(&fixture("broken"));
    assert!(matches!(result, Err(ResolverError::Tzdb(_))));
}

#[test]
fn missing_point_table_degrades_to_metadata() {
    let resolver = Resolver::initialize(&fixture("minimal")).unwrap();
    assert!(resolver.is_degraded());
    assert_eq!(resolver.reference_point_count(), 1);

    let london = resolver
        .find_zone_by_coordinate(GeoCoordinate::new(51.5074, -0.1278))
        .unwrap();
    assert_eq!(london, "Europe/London");
}

#[test]
fn resolver_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resolver>();
}

// ---------------------------------------------------------------------------
// Queries by name
// ---------------------------------------------------------------------------

#[test]
fn local_time_by_zone_name() {
    let resolver = resolver();
    let result = resolver
        .resolve_local_time("America/New_York", utc(2024, 7, 1, 12, 0))
        .unwrap()
        .unwrap();
    assert_eq!(result.zone_name, "America/New_York");
    assert_eq!(result.abbreviation, "EDT");
    assert_eq!(result.gmt_offset, TimeDelta::hours(-5));
    assert_eq!(result.dst_offset, TimeDelta::hours(1));
    assert_eq!(result.local_time.to_rfc3339(), "2024-07-01T08:00:00-04:00");

    let meta = resolver.zone_metadata("America/New_York").unwrap();
    assert_eq!(result.reference_coordinate, Some(meta.coordinate));
    assert_eq!(result.query_coordinate, Some(meta.coordinate));
}

#[test]
fn links_and_aliases_resolve() {
    let resolver = resolver();
    assert_eq!(resolver.canonical_zone_name("US/Eastern"), Some("America/New_York"));
    assert_eq!(resolver.canonical_zone_name("Eastern Standard Time"), Some("America/New_York"));
    assert_eq!(resolver.canonical_zone_name("Hawaiian Standard Time"), Some("Pacific/Honolulu"));
    // Mapped by the alias table but absent from the fixture data.
    assert_eq!(resolver.canonical_zone_name("Asia/Calcutta"), None);
    assert_eq!(resolver.canonical_zone_name("Nowhere/Land"), None);

    let result = resolver
        .resolve_local_time("Pacific Standard Time", utc(2024, 1, 15, 20, 0))
        .unwrap()
        .unwrap();
    assert_eq!(result.zone_name, "America/Los_Angeles");
    assert_eq!(result.abbreviation, "PST");
    assert_eq!(result.local_time.to_rfc3339(), "2024-01-15T12:00:00-08:00");

    assert!(resolver.zone_metadata("US/Pacific").is_some());
}

#[test]
fn custom_alias_tables_replace_builtin_ones() {
    let config = ResolverConfig {
        data: DataConfig {
            directory: fixture("tzdata"),
            ..DataConfig::default()
        },
        ..ResolverConfig::default()
    };
    let resolver = Resolver::with_aliases(&config, ZoneAliases::new(std::iter::empty(), [("Big/Apple", "America/New_York")])).unwrap();
    assert_eq!(resolver.canonical_zone_name("Big/Apple"), Some("America/New_York"));
    assert_eq!(resolver.canonical_zone_name("Eastern Standard Time"), None);
}

#[test]
fn unknown_zone_is_none() {
    let resolver = resolver();
    let t = utc(2024, 1, 1, 0, 0);
    assert!(resolver.resolve_local_time("Mars/Olympus_Mons", t).unwrap().is_none());
    assert!(resolver.rule_spans("Mars/Olympus_Mons", t, t).unwrap().is_none());
}

#[test]
fn historical_records() {
    let resolver = resolver();
    let cases = [
        ("Pacific/Honolulu", utc(1933, 5, 1, 12, 0), "HDT", "1933-05-01T02:30:00-09:30"),
        // No US rule fires within a year of 1933, so H%sT renders with an
        // empty letter.
        ("Pacific/Honolulu", utc(1933, 6, 1, 12, 0), "HT", "1933-06-01T01:30:00-10:30"),
        ("America/Chicago", utc(1936, 6, 1, 12, 0), "EST", "1936-06-01T07:00:00-05:00"),
        ("America/Los_Angeles", utc(1950, 6, 1, 12, 0), "PDT", "1950-06-01T05:00:00-07:00"),
        ("America/New_York", utc(1944, 1, 1, 12, 0), "EWT", "1944-01-01T08:00:00-04:00"),
        ("Pacific/Kiritimati", utc(1970, 1, 1, 0, 0), "-1040", "1969-12-31T13:20:00-10:40"),
        ("Pacific/Kiritimati", utc(2024, 1, 1, 0, 0), "+14", "2024-01-01T14:00:00+14:00"),
        ("America/New_York", utc(1883, 1, 1, 0, 0), "LMT", "1882-12-31T19:04:00-04:56"),
    ];
    for (zone, instant, abbreviation, local) in cases {
        let result = resolver.resolve_local_time(zone, instant).unwrap().unwrap();
        assert_eq!(result.abbreviation, abbreviation, "{zone} at {instant}");
        assert_eq!(result.local_time.to_rfc3339(), local, "{zone} at {instant}");
    }
}

#[test]
fn paired_abbreviation_format() {
    let resolver = Resolver::initialize(&fixture("minimal")).unwrap();
    let summer = resolver
        .resolve_local_time("Europe/London", utc(2024, 7, 1, 12, 0))
        .unwrap()
        .unwrap();
    assert_eq!(summer.abbreviation, "BST");
    assert_eq!(summer.local_time.to_rfc3339(), "2024-07-01T13:00:00+01:00");

    let winter = resolver
        .resolve_local_time("Europe/London", utc(2024, 1, 15, 12, 0))
        .unwrap()
        .unwrap();
    assert_eq!(winter.abbreviation, "GMT");
    assert_eq!(winter.dst_offset, TimeDelta::zero());
}

// ---------------------------------------------------------------------------
// Rule spans
// ---------------------------------------------------------------------------

#[test]
fn spring_forward_spans() {
    let resolver = resolver();
    let (begin, end) = (utc(2024, 3, 9, 0, 0), utc(2024, 3, 11, 0, 0));
    let spans = resolver.rule_spans("America/New_York", begin, end).unwrap().unwrap();
    assert!(spans_tile_range(&spans, begin, end));
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].dst_offset, TimeDelta::zero());
    assert_eq!(spans[1].begin, utc(2024, 3, 10, 7, 0));
    assert_eq!(spans[1].dst_offset, TimeDelta::hours(1));
}

#[test]
fn fall_back_spans() {
    let resolver = resolver();
    let (begin, end) = (utc(2024, 11, 2, 0, 0), utc(2024, 11, 4, 0, 0));
    let spans = resolver.rule_spans("US/Eastern", begin, end).unwrap().unwrap();
    assert!(spans_tile_range(&spans, begin, end));
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1].begin, utc(2024, 11, 3, 6, 0));
    assert_eq!(spans[0].abbreviation, "EDT");
    assert_eq!(spans[1].abbreviation, "EST");
}

#[test]
fn spans_tile_every_fixture_zone() {
    let resolver = resolver();
    let (begin, end) = (utc(1850, 1, 1, 0, 0), utc(2040, 1, 1, 0, 0));
    let names: Vec<String> = resolver.database().zones().map(|zone| zone.name().to_owned()).collect();
    for name in names {
        let spans = resolver.rule_spans(&name, begin, end).unwrap().unwrap();
        assert!(spans_tile_range(&spans, begin, end), "{name}");
    }
}

#[test]
fn empty_range_has_no_spans() {
    let resolver = resolver();
    let t = utc(2024, 1, 1, 0, 0);
    assert_eq!(resolver.rule_spans("America/Chicago", t, t).unwrap(), Some(Vec::new()));
}

// ---------------------------------------------------------------------------
// Queries by coordinate
// ---------------------------------------------------------------------------

#[test]
fn coordinate_in_new_york() {
    let resolver = resolver();
    let coordinate = GeoCoordinate::new(40.7128, -74.0060);
    let result = resolver
        .resolve_local_time_at(coordinate, utc(2024, 3, 10, 12, 0))
        .unwrap()
        .unwrap();
    assert_eq!(result.zone_name, "America/New_York");
    assert_eq!(result.abbreviation, "EDT");
    assert_eq!(result.query_coordinate, Some(coordinate));
    assert_ne!(result.reference_coordinate, Some(coordinate));
}

#[test]
fn reference_point_naming_a_link() {
    let resolver = resolver();
    let zone = resolver.find_zone_by_coordinate(GeoCoordinate::new(37.78, -122.41));
    assert_eq!(zone.as_deref(), Some("America/Los_Angeles"));
}

#[test]
fn date_line_wraps() {
    let resolver = resolver();
    let west = resolver.find_zone_by_coordinate(GeoCoordinate::new(0.0, -150.0001));
    let east = resolver.find_zone_by_coordinate(GeoCoordinate::new(0.0, 209.9999));
    assert_eq!(west.as_deref(), Some("Pacific/Kiritimati"));
    assert_eq!(east, west);
}

#[test]
fn open_ocean_uses_mariners_time() {
    let resolver = resolver();
    let coordinate = GeoCoordinate::new(-40.0, -120.0);
    assert!(resolver.find_zone_by_coordinate(coordinate).is_none());

    let result = resolver
        .resolve_local_time_at(coordinate, utc(2024, 6, 1, 12, 0))
        .unwrap()
        .unwrap();
    assert_eq!(result.zone_name, "GMT-8");
    assert_eq!(result.gmt_offset, TimeDelta::hours(-8));
    assert_eq!(result.dst_offset, TimeDelta::zero());
    assert_eq!(result.local_time.to_rfc3339(), "2024-06-01T04:00:00-08:00");
    assert_eq!(result, Resolver::mariners_time(coordinate, utc(2024, 6, 1, 12, 0)));
}

#[test]
fn point_for_unknown_zone_falls_back() {
    let resolver = resolver();
    let result = resolver
        .resolve_local_time_at(GeoCoordinate::new(30.05, -40.05), utc(2024, 6, 1, 12, 0))
        .unwrap()
        .unwrap();
    assert_eq!(result.zone_name, "GMT-3");
}

#[test]
fn distance_limit_is_configurable() {
    let config = ResolverConfig {
        data: DataConfig {
            directory: fixture("tzdata"),
            ..DataConfig::default()
        },
        ..ResolverConfig::default()
    };
    let mut far = config.clone();
    far.geolocation.max_distance_km = 5000.0;
    let near = Resolver::from_config(&config).unwrap();
    let far = Resolver::from_config(&far).unwrap();

    // Bermuda is roughly 1200 km from New York.
    let bermuda = GeoCoordinate::new(32.3078, -64.7505);
    assert!(near.find_zone_by_coordinate(bermuda).is_none());
    assert_eq!(far.find_zone_by_coordinate(bermuda).as_deref(), Some("America/New_York"));
}

#[test]
fn non_finite_coordinate_has_no_answer() {
    let resolver = resolver();
    let result = resolver
        .resolve_local_time_at(GeoCoordinate::new(f64::NAN, 10.0), utc(2024, 1, 1, 0, 0))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn results_serialize_to_json() {
    let resolver = resolver();
    let result = resolver
        .resolve_local_time("America/Chicago", utc(2024, 1, 15, 18, 0))
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["zone_name"], "America/Chicago");
    assert_eq!(json["abbreviation"], "CST");
    assert_eq!(json["gmt_offset"], -21_600);
    assert_eq!(json["dst_offset"], 0);
    assert_eq!(json["local_time"], "2024-01-15T12:00:00-06:00");
}
