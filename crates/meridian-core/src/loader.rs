//! Reading the data directory.
//!
//! The directory holds tz source files (any regular file without an
//! extension), the mandatory zone metadata table and an optional
//! reference-point table. Everything else is skipped.

use std::fs;
use std::path::{Path, PathBuf};

use meridian_tzdb::{
    ReferencePoint, ZoneDatabase, ZoneDatabaseBuilder, parse_reference_points, parse_zone_table,
};
use tracing::{debug, info, warn};

use crate::config::DataConfig;
use crate::error::ResolverError;

/// Table files that may sit next to the sources without being one.
const KNOWN_TABLES: &[&str] = &["iso3166.tab", "zone.tab", "zonenow.tab"];

/// Everything read from disk, ready to be indexed.
#[derive(Debug)]
pub struct LoadedData {
    /// The validated zone database, metadata included.
    pub database: ZoneDatabase,
    /// Reference points for coordinate lookup.
    pub reference_points: Vec<ReferencePoint>,
    /// Whether the points came from the metadata table because the
    /// reference-point table was missing.
    pub degraded: bool,
}

/// What to do with one directory entry.
#[derive(Debug, PartialEq, Eq)]
enum FileKind {
    Source,
    Table,
    Ignored,
    Unrecognised,
}

/// Read and parse the data directory described by `config`.
///
/// # Errors
///
/// [`ResolverError::MissingDirectory`] and
/// [`ResolverError::MissingMetadata`] for missing mandatory inputs,
/// [`ResolverError::Io`] for unreadable files, and
/// [`ResolverError::Tzdb`] for a tz source with a malformed field.
pub fn load_directory(config: &DataConfig) -> Result<LoadedData, ResolverError> {
    let directory = config.directory.as_path();
    if !directory.is_dir() {
        return Err(ResolverError::MissingDirectory {
            path: directory.to_path_buf(),
        });
    }
    let metadata_path = config.metadata_path();
    if !metadata_path.is_file() {
        return Err(ResolverError::MissingMetadata { path: metadata_path });
    }

    let mut builder = ZoneDatabaseBuilder::new();
    let metadata = parse_zone_table(&config.metadata_file, &read_text(&metadata_path)?);
    builder.add_metadata(metadata);

    let mut sources = 0_usize;
    for path in list_files(directory)? {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            warn!(path = %path.display(), "skipping file with a non UTF-8 name");
            continue;
        };
        match classify(config, file_name) {
            FileKind::Source => {
                let Some(text) = read_source(&path)? else {
                    continue;
                };
                let stats = builder.ingest_source(file_name, &text)?;
                debug!(
                    source = file_name,
                    zones = stats.zones,
                    duplicate_zones = stats.duplicate_zones,
                    rules = stats.rules,
                    links = stats.links,
                    skipped_lines = stats.skipped_lines,
                    "ingested tz source"
                );
                sources = sources.saturating_add(1);
            }
            FileKind::Table | FileKind::Ignored => {
                debug!(file = file_name, "skipping known non-source file");
            }
            FileKind::Unrecognised => {
                warn!(file = %path.display(), "unrecognised file in data directory, ignoring");
            }
        }
    }

    let database = builder.finish();

    let points_path = config.reference_points_path();
    let (reference_points, degraded) = if points_path.is_file() {
        let points = parse_reference_points(&config.reference_points_file, &read_text(&points_path)?);
        (points, false)
    } else {
        warn!(
            path = %points_path.display(),
            "reference-point table not found, geolocation falls back to one point per zone"
        );
        let points = database
            .metadata_entries()
            .map(|meta| ReferencePoint {
                zone: meta.zone.clone(),
                coordinate: meta.coordinate,
            })
            .collect();
        (points, true)
    };

    info!(
        directory = %directory.display(),
        sources,
        zones = database.zone_count(),
        reference_points = reference_points.len(),
        degraded,
        "data directory loaded"
    );

    Ok(LoadedData {
        database,
        reference_points,
        degraded,
    })
}

fn classify(config: &DataConfig, file_name: &str) -> FileKind {
    if file_name.starts_with('.') {
        return FileKind::Ignored;
    }
    if Path::new(file_name).extension().is_none() {
        return if config.is_ignored(file_name) {
            FileKind::Ignored
        } else {
            FileKind::Source
        };
    }
    let is_table = file_name.eq_ignore_ascii_case(&config.metadata_file)
        || file_name.eq_ignore_ascii_case(&config.reference_points_file)
        || KNOWN_TABLES
            .iter()
            .any(|table| file_name.eq_ignore_ascii_case(table));
    if is_table {
        FileKind::Table
    } else {
        FileKind::Unrecognised
    }
}

/// Regular files in `directory`, sorted by name so that duplicate
/// definitions resolve the same way on every platform.
fn list_files(directory: &Path) -> Result<Vec<PathBuf>, ResolverError> {
    let io_error = |source| ResolverError::Io {
        path: directory.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        if entry.file_type().map_err(io_error)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read a tz source. A file that is not UTF-8 is skipped like any other
/// file the loader cannot use.
fn read_source(path: &Path) -> Result<Option<String>, ResolverError> {
    let bytes = fs::read(path).map_err(|source| ResolverError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(error) => {
            warn!(
                file = %path.display(),
                valid_up_to = error.utf8_error().valid_up_to(),
                "tz source is not valid UTF-8, ignoring"
            );
            Ok(None)
        }
    }
}

fn read_text(path: &Path) -> Result<String, ResolverError> {
    fs::read_to_string(path).map_err(|source| ResolverError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let config = DataConfig::default();
        assert_eq!(classify(&config, "northamerica"), FileKind::Source);
        assert_eq!(classify(&config, "backward"), FileKind::Source);
        assert_eq!(classify(&config, "README"), FileKind::Ignored);
        assert_eq!(classify(&config, "leapseconds"), FileKind::Ignored);
        assert_eq!(classify(&config, ".gitignore"), FileKind::Ignored);
        assert_eq!(classify(&config, "zone1970.tab"), FileKind::Table);
        assert_eq!(classify(&config, "iso3166.tab"), FileKind::Table);
        assert_eq!(classify(&config, "TimeZoneGlobalPoints.tsv"), FileKind::Table);
        assert_eq!(classify(&config, "tzdata.zi"), FileKind::Unrecognised);
    }

    #[test]
    fn non_utf8_source_is_skipped() {
        let tzdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tzdata");
        assert!(matches!(read_source(&tzdata.join("garbled")), Ok(None)));
        assert!(matches!(read_source(&tzdata.join("pacific")), Ok(Some(text)) if text.contains("Kiritimati")));
        assert!(matches!(
            read_source(&tzdata.join("no-such-file")),
            Err(ResolverError::Io { .. })
        ));
    }

    #[test]
    fn missing_directory() {
        let config = DataConfig {
            directory: PathBuf::from("/nonexistent/meridian/tzdata"),
            ..DataConfig::default()
        };
        assert!(matches!(
            load_directory(&config),
            Err(ResolverError::MissingDirectory { .. })
        ));
    }
}
