//! UTC offset representation.
//!
//! Source data carries offsets with second precision (`-5:44:38`), but every
//! offset that is turned into an absolute instant goes through
//! [`round_to_minute`]: rounded to the nearest minute (half away from zero)
//! and clipped to [`MAX_OFFSET`] either side of UTC. The raw value is still
//! reported as the GMT offset of a span; only instant arithmetic uses the
//! rounded one.

use chrono::{FixedOffset, Offset, TimeDelta, Utc};

/// Largest representable distance from UTC, in minutes (14 hours).
const MAX_OFFSET_MINUTES: i64 = 14 * 60;

/// Largest representable distance from UTC.
pub const MAX_OFFSET: TimeDelta = TimeDelta::minutes(MAX_OFFSET_MINUTES);

/// Seconds in a minute.
const SECONDS_PER_MINUTE: i64 = 60;

/// Minutes in an hour.
const MINUTES_PER_HOUR: i64 = 60;

/// Round an offset to the nearest whole minute and clip it to `±14:00`.
pub fn round_to_minute(delta: TimeDelta) -> TimeDelta {
    let secs = delta.num_seconds();
    let half = SECONDS_PER_MINUTE / 2;
    let minutes = if secs >= 0 {
        secs.saturating_add(half) / SECONDS_PER_MINUTE
    } else {
        (secs.saturating_neg().saturating_add(half) / SECONDS_PER_MINUTE).saturating_neg()
    };
    TimeDelta::minutes(minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES))
}

/// Convert an offset into a [`FixedOffset`] after minute rounding.
pub fn to_fixed_offset(delta: TimeDelta) -> FixedOffset {
    let secs = i32::try_from(round_to_minute(delta).num_seconds()).unwrap_or(0);
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

/// Render an offset as `+hh:mm` / `-hh:mm` (after minute rounding).
pub fn format_offset(delta: TimeDelta) -> String {
    let minutes = round_to_minute(delta).num_minutes();
    let sign = if minutes < 0 { '-' } else { '+' };
    let abs = minutes.saturating_abs();
    format!(
        "{sign}{:02}:{:02}",
        abs / MINUTES_PER_HOUR,
        abs % MINUTES_PER_HOUR
    )
}

/// Serde adapter storing a [`TimeDelta`] as whole seconds.
///
/// Use with `#[serde(with = "meridian_types::offset::serde_seconds")]`.
pub mod serde_seconds {
    use chrono::TimeDelta;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as an `i64` number of seconds.
    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(delta.num_seconds())
    }

    /// Deserialize from an `i64` number of seconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(secs).ok_or_else(|| D::Error::custom("offset out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_minutes_are_unchanged() {
        assert_eq!(round_to_minute(TimeDelta::hours(-5)), TimeDelta::hours(-5));
        assert_eq!(round_to_minute(TimeDelta::minutes(330)), TimeDelta::minutes(330));
    }

    #[test]
    fn historical_seconds_round_to_nearest_minute() {
        // Indianapolis local mean time: -5:44:38
        let lmt = -(TimeDelta::hours(5) + TimeDelta::minutes(44) + TimeDelta::seconds(38));
        assert_eq!(round_to_minute(lmt), -TimeDelta::minutes(345));

        let small = TimeDelta::minutes(25) + TimeDelta::seconds(21);
        assert_eq!(round_to_minute(small), TimeDelta::minutes(25));
    }

    #[test]
    fn half_minute_rounds_away_from_zero() {
        assert_eq!(round_to_minute(TimeDelta::seconds(30)), TimeDelta::minutes(1));
        assert_eq!(round_to_minute(TimeDelta::seconds(-30)), TimeDelta::minutes(-1));
    }

    #[test]
    fn offsets_are_clipped() {
        assert_eq!(round_to_minute(TimeDelta::hours(15)), MAX_OFFSET);
        assert_eq!(round_to_minute(TimeDelta::hours(-20)), -MAX_OFFSET);
    }

    #[test]
    fn fixed_offset_conversion() {
        let fixed = to_fixed_offset(TimeDelta::hours(-4));
        assert_eq!(fixed.local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn offset_formatting() {
        assert_eq!(format_offset(TimeDelta::hours(-5)), "-05:00");
        assert_eq!(format_offset(TimeDelta::minutes(345)), "+05:45");
        assert_eq!(format_offset(TimeDelta::zero()), "+00:00");
    }
}
