//! The query surface: names and coordinates in, local time out.
//!
//! A [`Resolver`] is built once from a data directory and is read-only
//! afterwards. Every query takes `&self`, so one resolver can be shared
//! across threads behind an `Arc`.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use meridian_rules::RuleEngine;
use meridian_tzdb::{ZoneDatabase, ZoneMetadata};
use meridian_types::{EffectiveSpan, GeoCoordinate, QueryResult};
use tracing::{debug, info, warn};

use crate::aliases::ZoneAliases;
use crate::config::{DataConfig, ResolverConfig};
use crate::error::ResolverError;
use crate::geoindex::ReferenceIndex;
use crate::loader;
use crate::mariner;

/// Time-zone database plus geolocation index.
#[derive(Debug)]
pub struct Resolver {
    database: ZoneDatabase,
    index: ReferenceIndex,
    aliases: ZoneAliases,
    max_distance_km: f64,
    window: TimeDelta,
    degraded: bool,
}

impl Resolver {
    /// Build a resolver from `directory` with default settings and the
    /// built-in alias tables.
    ///
    /// # Errors
    ///
    /// See [`Resolver::from_config`].
    pub fn initialize(directory: &Path) -> Result<Self, ResolverError> {
        let config = ResolverConfig {
            data: DataConfig {
                directory: directory.to_path_buf(),
                ..DataConfig::default()
            },
            ..ResolverConfig::default()
        };
        Self::from_config(&config)
    }

    /// Build a resolver as described by `config`, with the built-in alias
    /// tables.
    ///
    /// # Errors
    ///
    /// [`ResolverError::MissingDirectory`] or
    /// [`ResolverError::MissingMetadata`] when a mandatory input is absent,
    /// [`ResolverError::Io`] when a file cannot be read, and
    /// [`ResolverError::Tzdb`] when a tz source has a malformed field.
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolverError> {
        Self::with_aliases(config, ZoneAliases::builtin())
    }

    /// Build a resolver with caller-supplied alias tables.
    ///
    /// # Errors
    ///
    /// See [`Resolver::from_config`].
    pub fn with_aliases(config: &ResolverConfig, aliases: ZoneAliases) -> Result<Self, ResolverError> {
        let loaded = loader::load_directory(&config.data)?;
        let index = ReferenceIndex::build(loaded.reference_points, config.geolocation.wrap_margin_degrees)?;
        let window = TimeDelta::try_days(i64::from(config.query.window_days.max(1))).unwrap_or(TimeDelta::days(5));

        info!(
            zones = loaded.database.zone_count(),
            links = loaded.database.link_count(),
            reference_points = index.len(),
            aliases = aliases.len(),
            "resolver ready"
        );

        Ok(Self {
            database: loaded.database,
            index,
            aliases,
            max_distance_km: config.geolocation.max_distance_km,
            window,
            degraded: loaded.degraded,
        })
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    /// Resolve `name` to the name of a zone with a definition.
    ///
    /// A name that is neither a zone nor a link is first looked up in the
    /// alias tables. The result then follows at most one link.
    pub fn canonical_zone_name(&self, name: &str) -> Option<&str> {
        let name = if self.database.is_known_name(name) {
            name
        } else {
            self.aliases.lookup(name).unwrap_or(name)
        };
        self.database.resolve_name(name)
    }

    /// Metadata for `name`, trying the name as given before its canonical
    /// form.
    pub fn zone_metadata(&self, name: &str) -> Option<&ZoneMetadata> {
        self.database
            .metadata(name)
            .or_else(|| self.canonical_zone_name(name).and_then(|zone| self.database.metadata(zone)))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Effective spans of zone `name` tiling `[begin, end)`.
    ///
    /// Returns `Ok(None)` when the name does not resolve to a zone.
    ///
    /// # Errors
    ///
    /// [`ResolverError::Rules`] when a transition cannot be represented.
    pub fn rule_spans(
        &self,
        name: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Vec<EffectiveSpan>>, ResolverError> {
        let Some(zone) = self.canonical_zone_name(name) else {
            debug!(zone = name, "unknown zone name");
            return Ok(None);
        };
        let spans = RuleEngine::new(&self.database).spans(zone, begin, end)?;
        Ok(Some(spans))
    }

    /// Local time in zone `name` at `utc`.
    ///
    /// Returns `Ok(None)` when the name does not resolve to a zone.
    ///
    /// # Errors
    ///
    /// [`ResolverError::Coverage`] if no span covers `utc`, which means the
    /// database or the engine is inconsistent, and [`ResolverError::Rules`]
    /// from span resolution.
    pub fn resolve_local_time(&self, name: &str, utc: DateTime<Utc>) -> Result<Option<QueryResult>, ResolverError> {
        let Some(zone) = self.canonical_zone_name(name) else {
            debug!(zone = name, "unknown zone name");
            return Ok(None);
        };

        let begin = utc.checked_sub_signed(self.window).unwrap_or(utc);
        let end = utc
            .checked_add_signed(self.window)
            .or_else(|| utc.checked_add_signed(TimeDelta::seconds(1)))
            .unwrap_or(utc);
        let spans = RuleEngine::new(&self.database).spans(zone, begin, end)?;
        let span = spans
            .iter()
            .find(|span| span.contains(utc))
            .ok_or_else(|| ResolverError::Coverage {
                zone: zone.to_owned(),
                instant: utc,
            })?;

        let reference = self.zone_metadata(name).map(|meta| meta.coordinate);
        Ok(Some(QueryResult {
            local_time: utc.with_timezone(&span.fixed_offset()),
            gmt_offset: span.gmt_offset,
            dst_offset: span.dst_offset,
            zone_name: zone.to_owned(),
            abbreviation: span.abbreviation.clone(),
            query_coordinate: reference,
            reference_coordinate: reference,
        }))
    }

    /// Local time at `coordinate` at `utc`.
    ///
    /// The nearest reference point decides the zone. When none lies within
    /// the configured distance, or its zone is unknown, the answer is
    /// mariner's time. `Ok(None)` only for non-finite coordinates.
    ///
    /// # Errors
    ///
    /// As for [`Resolver::resolve_local_time`].
    pub fn resolve_local_time_at(
        &self,
        coordinate: GeoCoordinate,
        utc: DateTime<Utc>,
    ) -> Result<Option<QueryResult>, ResolverError> {
        if !coordinate.is_finite() {
            return Ok(None);
        }
        let Some(zone) = self.find_zone_by_coordinate(coordinate) else {
            debug!(%coordinate, "no zone nearby, using mariner's time");
            return Ok(Some(mariner::mariners_time(coordinate, utc)));
        };
        let result = self.resolve_local_time(&zone, utc)?.map(|mut result| {
            result.query_coordinate = Some(coordinate);
            result
        });
        Ok(result)
    }

    /// Zone whose nearest reference point lies within the configured
    /// distance of `coordinate`.
    pub fn find_zone_by_coordinate(&self, coordinate: GeoCoordinate) -> Option<String> {
        let (point, distance_km) = self.index.nearest(coordinate)?;
        if distance_km > self.max_distance_km {
            debug!(%coordinate, nearest = %point.zone, distance_km, "nearest reference point too far away");
            return None;
        }
        let zone = self.canonical_zone_name(&point.zone);
        if zone.is_none() {
            warn!(zone = %point.zone, "reference point names an unknown zone");
        }
        zone.map(str::to_owned)
    }

    /// Mariner's time at `coordinate`, regardless of nearby zones.
    pub fn mariners_time(coordinate: GeoCoordinate, utc: DateTime<Utc>) -> QueryResult {
        mariner::mariners_time(coordinate, utc)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The underlying zone database.
    pub const fn database(&self) -> &ZoneDatabase {
        &self.database
    }

    /// The alias tables in use.
    pub const fn aliases(&self) -> &ZoneAliases {
        &self.aliases
    }

    /// Number of reference points available for geolocation.
    pub fn reference_point_count(&self) -> usize {
        self.index.len()
    }

    /// Whether geolocation runs on metadata coordinates only because the
    /// reference-point table was missing.
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }
}
