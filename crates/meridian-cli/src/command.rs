//! Command-line parsing.

use chrono::{DateTime, Utc};
use meridian_types::GeoCoordinate;

use crate::error::CliError;

/// Usage text printed for `help` and appended to usage errors.
pub const USAGE: &str = "\
usage:
  meridian zone <name> [<instant>]          local time in a zone
  meridian locate <lat> <lon> [<instant>]   local time at a coordinate
  meridian spans <name> <begin> <end>       offset/DST spans over a range
  meridian help

Instants are RFC 3339 (2024-03-10T07:00:00Z) and default to now.
The config file is read from $MERIDIAN_CONFIG (default meridian-config.yaml).";

/// One parsed invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Local time in a named zone.
    Zone {
        /// Zone, link or alias name.
        name: String,
        /// Instant to evaluate.
        at: DateTime<Utc>,
    },
    /// Local time at a coordinate.
    Locate {
        /// Where to evaluate.
        coordinate: GeoCoordinate,
        /// Instant to evaluate.
        at: DateTime<Utc>,
    },
    /// Effective spans of a zone.
    Spans {
        /// Zone, link or alias name.
        name: String,
        /// Start of the range.
        begin: DateTime<Utc>,
        /// End of the range (exclusive).
        end: DateTime<Utc>,
    },
    /// Print usage.
    Help,
}

/// Parse `args` (without the program name). Omitted instants become `now`.
pub fn parse_args(args: &[String], now: DateTime<Utc>) -> Result<Command, CliError> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["help" | "-h" | "--help"] => Ok(Command::Help),
        ["zone", name] => Ok(Command::Zone {
            name: (*name).to_owned(),
            at: now,
        }),
        ["zone", name, at] => Ok(Command::Zone {
            name: (*name).to_owned(),
            at: parse_instant(at)?,
        }),
        ["locate", lat, lon] => Ok(Command::Locate {
            coordinate: parse_coordinate(lat, lon)?,
            at: now,
        }),
        ["locate", lat, lon, at] => Ok(Command::Locate {
            coordinate: parse_coordinate(lat, lon)?,
            at: parse_instant(at)?,
        }),
        ["spans", name, begin, end] => Ok(Command::Spans {
            name: (*name).to_owned(),
            begin: parse_instant(begin)?,
            end: parse_instant(end)?,
        }),
        [command, ..] => Err(CliError::Usage(format!(
            "unrecognised arguments for {command:?}"
        ))),
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|source| CliError::InvalidInstant {
            value: value.to_owned(),
            source,
        })
}

fn parse_coordinate(latitude: &str, longitude: &str) -> Result<GeoCoordinate, CliError> {
    let parse = |value: &str| {
        value.parse::<f64>().map_err(|source| CliError::InvalidCoordinate {
            value: value.to_owned(),
            source,
        })
    };
    Ok(GeoCoordinate::new(parse(latitude)?, parse(longitude)?))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| (*arg).to_owned()).collect()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().unwrap_or_default()
    }

    #[test]
    fn zone_with_and_without_instant() {
        assert_eq!(
            parse_args(&args(&["zone", "Europe/Paris"]), now()).ok(),
            Some(Command::Zone {
                name: "Europe/Paris".to_owned(),
                at: now(),
            })
        );
        let parsed = parse_args(&args(&["zone", "Europe/Paris", "2024-03-10T09:00:00+02:00"]), now());
        assert!(matches!(
            parsed,
            Ok(Command::Zone { at, .. }) if at == Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).single().unwrap_or_default()
        ));
    }

    #[test]
    fn locate_parses_numbers() {
        let parsed = parse_args(&args(&["locate", "40.7128", "-74.0060"]), now());
        assert!(matches!(
            parsed,
            Ok(Command::Locate { coordinate, .. }) if coordinate == GeoCoordinate::new(40.7128, -74.0060)
        ));
        assert!(matches!(
            parse_args(&args(&["locate", "north", "-74"]), now()),
            Err(CliError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn spans_need_both_bounds() {
        assert!(matches!(
            parse_args(&args(&["spans", "UTC", "2024-01-01T00:00:00Z", "2025-01-01T00:00:00Z"]), now()),
            Ok(Command::Spans { .. })
        ));
        assert!(matches!(
            parse_args(&args(&["spans", "UTC", "2024-01-01T00:00:00Z"]), now()),
            Err(CliError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&args(&["spans", "UTC", "yesterday", "2025-01-01T00:00:00Z"]), now()),
            Err(CliError::InvalidInstant { .. })
        ));
    }

    #[test]
    fn help_and_unknown() {
        assert_eq!(parse_args(&[], now()).ok(), Some(Command::Help));
        assert_eq!(parse_args(&args(&["--help"]), now()).ok(), Some(Command::Help));
        assert!(matches!(
            parse_args(&args(&["frobnicate"]), now()),
            Err(CliError::Usage(_))
        ));
    }
}
