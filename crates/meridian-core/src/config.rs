//! Configuration loading and typed config structures for the resolver.
//!
//! The configuration lives in `meridian-config.yaml`. Every section and
//! field has a default, so an empty document (or no document at all) gives
//! a working resolver reading `./tzdata`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Environment variable overriding [`DataConfig::directory`].
pub const DATA_DIR_ENV: &str = "MERIDIAN_DATA_DIR";

/// Environment variable overriding [`LoggingConfig::level`].
pub const LOG_LEVEL_ENV: &str = "MERIDIAN_LOG";

/// Top-level resolver configuration.
///
/// Mirrors the structure of `meridian-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResolverConfig {
    /// Where the tz sources and tables live.
    #[serde(default)]
    pub data: DataConfig,

    /// Coordinate lookup tuning.
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Local-time query tuning.
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ResolverConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MERIDIAN_DATA_DIR` overrides `data.directory`
    /// - `MERIDIAN_LOG` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override fields from the process environment when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`, keyed by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(DATA_DIR_ENV) {
            self.data.directory = PathBuf::from(val);
        }
        if let Some(val) = lookup(LOG_LEVEL_ENV) {
            self.logging.level = val;
        }
    }
}

/// Data directory layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Directory holding the tz sources and both tables.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// File name of the mandatory zone metadata table.
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// File name of the optional reference-point table.
    #[serde(default = "default_reference_points_file")]
    pub reference_points_file: String,

    /// Extension-less files that are not tz sources. Compared
    /// case-insensitively.
    #[serde(default = "default_ignored_files")]
    pub ignored_files: Vec<String>,
}

impl DataConfig {
    /// Full path of the metadata table.
    pub fn metadata_path(&self) -> PathBuf {
        self.directory.join(&self.metadata_file)
    }

    /// Full path of the reference-point table.
    pub fn reference_points_path(&self) -> PathBuf {
        self.directory.join(&self.reference_points_file)
    }

    /// Whether `file_name` is on the ignore list.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignored_files
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(file_name))
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            metadata_file: default_metadata_file(),
            reference_points_file: default_reference_points_file(),
            ignored_files: default_ignored_files(),
        }
    }
}

/// Coordinate lookup configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeolocationConfig {
    /// Farthest a reference point may be from the query and still decide
    /// its zone. Beyond this the resolver falls back to mariner's time.
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,

    /// Reference points within this many degrees of the antimeridian are
    /// also indexed on the other side of it.
    #[serde(default = "default_wrap_margin_degrees")]
    pub wrap_margin_degrees: f64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
            wrap_margin_degrees: default_wrap_margin_degrees(),
        }
    }
}

/// Local-time query configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryConfig {
    /// Half-width in days of the range evaluated around a queried instant.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_directory() -> PathBuf {
    PathBuf::from("tzdata")
}

fn default_metadata_file() -> String {
    "zone1970.tab".to_owned()
}

fn default_reference_points_file() -> String {
    "TimeZoneGlobalPoints.tsv".to_owned()
}

fn default_ignored_files() -> Vec<String> {
    [
        "Makefile",
        "README",
        "NEWS",
        "LICENSE",
        "CONTRIBUTING",
        "SECURITY",
        "calendars",
        "leapseconds",
        "version",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

const fn default_max_distance_km() -> f64 {
    100.0
}

const fn default_wrap_margin_degrees() -> f64 {
    30.0
}

const fn default_window_days() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_without_env(yaml: &str) -> ResolverConfig {
        serde_yml::from_str(yaml).unwrap_or_default()
    }

    #[test]
    fn empty_document_gives_defaults() {
        let config = parse_without_env("{}");
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.data.directory, PathBuf::from("tzdata"));
        assert_eq!(config.query.window_days, 5);
        assert!((config.geolocation.max_distance_km - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_without_env(
            "
data:
  directory: /srv/tzdata
  ignored_files: [README]
geolocation:
  max_distance_km: 250.5
",
        );
        assert_eq!(config.data.directory, PathBuf::from("/srv/tzdata"));
        assert_eq!(config.data.metadata_file, "zone1970.tab");
        assert_eq!(config.data.ignored_files, vec!["README".to_owned()]);
        assert!((config.geolocation.max_distance_km - 250.5).abs() < f64::EPSILON);
        assert!((config.geolocation.wrap_margin_degrees - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = ResolverConfig::default();
        config.apply_overrides(|key| match key {
            DATA_DIR_ENV => Some("/opt/zones".to_owned()),
            LOG_LEVEL_ENV => Some("debug".to_owned()),
            _ => None,
        });
        assert_eq!(config.data.directory, PathBuf::from("/opt/zones"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn ignore_list_is_case_insensitive() {
        let data = DataConfig::default();
        assert!(data.is_ignored("readme"));
        assert!(data.is_ignored("Makefile"));
        assert!(!data.is_ignored("northamerica"));
        assert_eq!(data.metadata_path(), PathBuf::from("tzdata").join("zone1970.tab"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            ResolverConfig::parse("data: [unterminated"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
