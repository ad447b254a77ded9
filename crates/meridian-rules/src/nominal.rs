//! Nominal (offset-less) transition times.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use meridian_types::to_fixed_offset;

/// A date and time of day as written in a rule, before any UTC offset is
/// applied.
///
/// Nominal times are only good for ordering rule firings. Turning one into
/// an instant requires choosing the offset it is read against, which is
/// what [`resolve`](Self::resolve) does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NominalTime(NaiveDateTime);

impl NominalTime {
    /// Wrap a naive date-time.
    pub const fn new(naive: NaiveDateTime) -> Self {
        Self(naive)
    }

    /// Midnight at the start of January 1st of `year`.
    pub fn start_of_year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1).map(|date| Self(date.and_time(NaiveTime::MIN)))
    }

    /// The wrapped naive date-time.
    pub const fn naive(self) -> NaiveDateTime {
        self.0
    }

    /// Read the nominal time against `offset` (rounded to the minute) and
    /// return the UTC instant it denotes.
    pub fn resolve(self, offset: TimeDelta) -> Option<DateTime<Utc>> {
        to_fixed_offset(offset)
            .from_local_datetime(&self.0)
            .single()
            .map(|instant| instant.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal(y: i32, m: u32, d: u32, h: u32) -> Option<NominalTime> {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .map(NominalTime::new)
    }

    #[test]
    fn ordering_follows_wall_clock() {
        assert!(nominal(2024, 3, 10, 2) < nominal(2024, 11, 3, 2));
        assert!(NominalTime::start_of_year(2024) < nominal(2024, 1, 1, 1));
    }

    #[test]
    fn resolve_subtracts_offset() {
        let resolved = nominal(2024, 3, 10, 2).and_then(|n| n.resolve(TimeDelta::hours(-5)));
        assert_eq!(
            resolved.map(|t| t.to_rfc3339()).as_deref(),
            Some("2024-03-10T07:00:00+00:00")
        );
    }

    #[test]
    fn resolve_rounds_offset_to_minute() {
        // -4:56:02 rounds to -4:56.
        let lmt = -(TimeDelta::hours(4) + TimeDelta::minutes(56) + TimeDelta::seconds(2));
        let resolved = nominal(1883, 1, 1, 0).and_then(|n| n.resolve(lmt));
        assert_eq!(
            resolved.map(|t| t.to_rfc3339()).as_deref(),
            Some("1883-01-01T04:56:00+00:00")
        );
    }
}
