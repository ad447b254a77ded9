//! The zone database model: zones, rules, links and metadata.
//!
//! Everything here is built once while parsing and never mutated afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc, Weekday};
use meridian_types::GeoCoordinate;
use serde::{Deserialize, Serialize};

use crate::error::TzdbError;

/// First year rules are evaluated for. `min` in a FROM field maps here.
pub const MIN_YEAR: i32 = 1;

/// Last year rules are evaluated for. `max` in a TO field maps here.
pub const MAX_YEAR: i32 = 9999;

// ---------------------------------------------------------------------------
// Rule building blocks
// ---------------------------------------------------------------------------

/// The clock a time-of-day is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockReference {
    /// Local wall clock, including any DST in effect (`w`).
    Wall,
    /// Local standard time, ignoring DST (`s`).
    LocalStandard,
    /// UTC (`u`, `g` or `z`).
    Universal,
    /// No suffix given; treated like wall-clock time.
    Unspecified,
}

/// A time of day relative to midnight, tagged with the clock it refers to.
///
/// The offset may be 24 hours or more (or negative), in which case the
/// time rolls onto a neighbouring day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    /// Offset from midnight.
    pub offset: TimeDelta,
    /// Which clock the offset is measured on.
    pub clock: ClockReference,
}

impl TimeOfDay {
    /// Midnight on an unspecified clock.
    pub const MIDNIGHT: Self = Self {
        offset: TimeDelta::zero(),
        clock: ClockReference::Unspecified,
    };

    /// Combine with a calendar date into a naive date-time.
    pub fn on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_time(NaiveTime::MIN).checked_add_signed(self.offset)
    }
}

/// Which day of the month a rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRule {
    /// A fixed day of the month (`15`).
    DayOfMonth(u32),
    /// The first given weekday on or after a day (`Sun>=8`).
    WeekdayOnOrAfter {
        /// Weekday to look for.
        weekday: Weekday,
        /// Earliest day of the month.
        day: u32,
    },
    /// The last given weekday on or before a day (`Sun<=25`).
    WeekdayOnOrBefore {
        /// Weekday to look for.
        weekday: Weekday,
        /// Latest day of the month.
        day: u32,
    },
    /// The last given weekday of the month (`lastSun`).
    LastWeekday(Weekday),
}

impl DayRule {
    /// Resolve to a concrete date in `year`/`month`.
    ///
    /// `Dow>=N` may spill into the following month and `Dow<=N` into the
    /// preceding one, as the tz sources allow. Returns `None` for dates that
    /// do not exist (`Feb 30`) or fall outside chrono's range.
    pub fn resolve(&self, year: i32, month: u32) -> Option<NaiveDate> {
        match *self {
            Self::DayOfMonth(day) => NaiveDate::from_ymd_opt(year, month, day),
            Self::WeekdayOnOrAfter { weekday, day } => {
                let start = NaiveDate::from_ymd_opt(year, month, day)?;
                std::iter::successors(Some(start), NaiveDate::succ_opt)
                    .take(7)
                    .find(|date| chrono::Datelike::weekday(date) == weekday)
            }
            Self::WeekdayOnOrBefore { weekday, day } => {
                let start = NaiveDate::from_ymd_opt(year, month, day)?;
                last_matching_on_or_before(start, weekday)
            }
            Self::LastWeekday(weekday) => {
                let first_of_next = if month == 12 {
                    NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
                };
                last_matching_on_or_before(first_of_next.pred_opt()?, weekday)
            }
        }
    }
}

fn last_matching_on_or_before(start: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    std::iter::successors(Some(start), NaiveDate::pred_opt)
        .take(7)
        .find(|date| chrono::Datelike::weekday(date) == weekday)
}

/// One end of a rule's year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearBound {
    /// The indefinite past.
    Min,
    /// A specific year.
    Year(i32),
    /// The indefinite future.
    Max,
}

impl YearBound {
    /// The concrete year this bound stands for, clamped to the evaluated
    /// range.
    pub const fn year(self) -> i32 {
        match self {
            Self::Min => MIN_YEAR,
            Self::Year(year) => year,
            Self::Max => MAX_YEAR,
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One `Rule` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    /// Name of the rule set this record belongs to.
    pub name: String,
    /// First year the rule applies.
    pub from: YearBound,
    /// Last year the rule applies (inclusive).
    pub to: YearBound,
    /// Month the rule fires in, 1-based.
    pub month: u32,
    /// Day within the month.
    pub day: DayRule,
    /// Time of day the rule fires.
    pub at: TimeOfDay,
    /// Daylight saving amount while the rule is active.
    pub save: TimeDelta,
    /// Substituted for `%s` in the zone format. Empty when the source says `-`.
    pub letter: String,
}

impl RuleRecord {
    /// Whether the rule fires in `year`.
    pub const fn applies_in(&self, year: i32) -> bool {
        self.from.year() <= year && year <= self.to.year()
    }

    /// The naive date-time the rule fires at in `year`, not yet tied to any
    /// offset.
    pub fn transition_in(&self, year: i32) -> Option<NaiveDateTime> {
        self.day.resolve(year, self.month).and_then(|date| self.at.on(date))
    }
}

/// All records sharing one rule name, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    /// The shared rule name.
    pub name: String,
    /// Records in the order they were declared.
    pub rules: Vec<RuleRecord>,
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// The RULES column of a zone line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleReference {
    /// `-`: standard time only.
    None,
    /// The name of a rule set.
    Named(String),
    /// A fixed amount of saving time (`1:00`).
    FixedSave(TimeDelta),
}

/// One `Zone` line or continuation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    /// Zone name, shared by every record in the series.
    pub name: String,
    /// Base (standard) offset from UTC.
    pub gmt_offset: TimeDelta,
    /// Which daylight saving rules apply.
    pub rules: RuleReference,
    /// Abbreviation format, possibly containing `%s` or a `STD/DST` pair.
    pub format: String,
    /// First instant the record no longer applies. `None` means forever.
    pub until: Option<DateTime<Utc>>,
}

impl ZoneRecord {
    /// Render the abbreviation for a rule letter.
    ///
    /// `%s` is replaced by the letter, which may be empty. A slash-separated
    /// format picks its standard or daylight half instead.
    pub fn abbreviation(&self, letter: &str, is_dst: bool) -> String {
        if let Some((standard, daylight)) = self.format.split_once('/') {
            return if is_dst { daylight } else { standard }.to_owned();
        }
        self.format.replace("%s", letter)
    }
}

/// The period of time one [`ZoneRecord`] governs.
#[derive(Debug, Clone, Copy)]
pub struct ZonePeriod<'a> {
    /// First covered instant. `None` means the indefinite past.
    pub start: Option<DateTime<Utc>>,
    /// The governing record. Its `until` is the end of the period.
    pub record: &'a ZoneRecord,
}

impl ZonePeriod<'_> {
    /// Intersect the period with `[begin, end)`. Returns `None` when the
    /// intersection is empty.
    pub fn clip(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let from = self.start.map_or(begin, |start| start.max(begin));
        let to = self.record.until.map_or(end, |until| until.min(end));
        (from < to).then_some((from, to))
    }
}

/// The ordered records of one zone.
///
/// Every record but the last has an UNTIL boundary, boundaries strictly
/// increase, and the last record runs forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSeries {
    name: String,
    records: Vec<ZoneRecord>,
}

impl ZoneSeries {
    /// Validate and wrap a zone's records.
    ///
    /// # Errors
    ///
    /// Returns [`TzdbError::InvalidSeries`] if the series is empty, a
    /// non-final record is open-ended, boundaries do not strictly increase,
    /// or the final record has a boundary.
    pub fn new(name: impl Into<String>, records: Vec<ZoneRecord>) -> Result<Self, TzdbError> {
        let name = name.into();
        let invalid = |reason: &str| TzdbError::InvalidSeries {
            zone: name.clone(),
            reason: reason.to_owned(),
        };

        let Some(last) = records.last() else {
            return Err(invalid("no zone records"));
        };
        if last.until.is_some() {
            return Err(invalid("final record has an UNTIL boundary"));
        }
        for pair in records.windows(2) {
            let [earlier, later] = pair else { continue };
            let Some(boundary) = earlier.until else {
                return Err(invalid("a record before the final one has no UNTIL boundary"));
            };
            if later.until.is_some_and(|next| next <= boundary) {
                return Err(invalid("UNTIL boundaries do not strictly increase"));
            }
        }

        Ok(Self { name, records })
    }

    /// Zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records in ascending boundary order.
    pub fn records(&self) -> &[ZoneRecord] {
        &self.records
    }

    /// Each record paired with the instant it starts at.
    pub fn periods(&self) -> impl Iterator<Item = ZonePeriod<'_>> {
        std::iter::once(None)
            .chain(self.records.iter().map(|record| record.until))
            .zip(self.records.iter())
            .map(|(start, record)| ZonePeriod { start, record })
    }

    /// The record in force at `instant`.
    pub fn record_at(&self, instant: DateTime<Utc>) -> Option<&ZoneRecord> {
        self.records
            .iter()
            .find(|record| record.until.is_none_or(|until| instant < until))
    }
}

/// A `Link` line: `alias` is another name for `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneLink {
    /// The canonical zone name.
    pub target: String,
    /// The alternative name.
    pub alias: String,
}

// ---------------------------------------------------------------------------
// Geographic tables
// ---------------------------------------------------------------------------

/// One row of the zone metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMetadata {
    /// Zone name.
    pub zone: String,
    /// The zone's principal location.
    pub coordinate: GeoCoordinate,
    /// ISO 3166 codes of the countries that use the zone.
    pub country_codes: BTreeSet<String>,
    /// Free-form comment, if present.
    pub comment: Option<String>,
}

/// One row of the reference-point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Zone that applies at this location.
    pub zone: String,
    /// Where the point is.
    pub coordinate: GeoCoordinate,
}
