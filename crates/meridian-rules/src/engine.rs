//! Span resolution.
//!
//! For a zone and a UTC range `[begin, end)` the engine:
//!
//! 1. Splits the range at the zone's record boundaries.
//! 2. For each piece, either emits one flat span (no rules, fixed save) or
//!    collects every firing of the record's rule set in the surrounding
//!    years and orders them by nominal time.
//! 3. Walks the firings in order, resolving each to an instant against the
//!    offset its clock refers to. Wall-clock firings depend on whatever
//!    save was active before them, so resolution is strictly sequential.
//! 4. Caps the piece with the last active rule if the firings run out
//!    before its end.

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use meridian_types::EffectiveSpan;
use meridian_tzdb::{
    ClockReference, MAX_YEAR, MIN_YEAR, RuleRecord, RuleReference, ZoneDatabase, ZoneRecord,
};
use tracing::{debug, trace};

use crate::error::RuleError;
use crate::nominal::NominalTime;

/// Computes effective spans over a read-only [`ZoneDatabase`].
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'a> {
    database: &'a ZoneDatabase,
}

/// One firing of a rule, not yet tied to an offset.
#[derive(Debug, Clone, Copy)]
struct Firing<'a> {
    at: NominalTime,
    rule: &'a RuleRecord,
}

impl<'a> RuleEngine<'a> {
    /// Create an engine over `database`.
    pub const fn new(database: &'a ZoneDatabase) -> Self {
        Self { database }
    }

    /// Effective spans of `zone` tiling `[begin, end)`.
    ///
    /// `zone` must be an exact zone name; links and aliases are resolved by
    /// the caller. An empty or inverted range yields no spans.
    ///
    /// # Errors
    ///
    /// [`RuleError::UnknownZone`] if no series exists under `zone`, and
    /// [`RuleError::DateOutOfRange`] if a transition cannot be represented.
    pub fn spans(
        &self,
        zone: &str,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EffectiveSpan>, RuleError> {
        let series = self
            .database
            .zone(zone)
            .ok_or_else(|| RuleError::UnknownZone(zone.to_owned()))?;
        if begin >= end {
            return Ok(Vec::new());
        }

        let mut spans = Vec::new();
        for period in series.periods() {
            let Some((sub_begin, sub_end)) = period.clip(begin, end) else {
                continue;
            };
            self.record_spans(period.record, sub_begin, sub_end, &mut spans)?;
        }
        trace!(zone, spans = spans.len(), "resolved effective spans");
        Ok(spans)
    }

    fn record_spans(
        &self,
        record: &ZoneRecord,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
        out: &mut Vec<EffectiveSpan>,
    ) -> Result<(), RuleError> {
        match &record.rules {
            RuleReference::None => {
                out.push(flat_span(record, begin, end, TimeDelta::zero()));
                Ok(())
            }
            RuleReference::FixedSave(save) => {
                out.push(flat_span(record, begin, end, *save));
                Ok(())
            }
            RuleReference::Named(name) => {
                let Some(rule_set) = self.database.rule_set(name) else {
                    debug!(zone = %record.name, rules = %name, "rule set not defined, using standard time");
                    out.push(flat_span(record, begin, end, TimeDelta::zero()));
                    return Ok(());
                };
                walk_rules(record, &rule_set.rules, begin, end, out)
            }
        }
    }
}

/// A single span covering the whole piece.
fn flat_span(record: &ZoneRecord, begin: DateTime<Utc>, end: DateTime<Utc>, save: TimeDelta) -> EffectiveSpan {
    EffectiveSpan {
        begin,
        end,
        gmt_offset: record.gmt_offset,
        dst_offset: save,
        abbreviation: record.abbreviation("", !save.is_zero()),
    }
}

/// Span carrying the save and letter of `active`, or standard time with an
/// empty letter when no rule has fired yet.
fn rule_span(record: &ZoneRecord, active: Option<&RuleRecord>, begin: DateTime<Utc>, end: DateTime<Utc>) -> EffectiveSpan {
    let (save, letter) = active.map_or((TimeDelta::zero(), ""), |rule| (rule.save, rule.letter.as_str()));
    EffectiveSpan {
        begin,
        end,
        gmt_offset: record.gmt_offset,
        dst_offset: save,
        abbreviation: record.abbreviation(letter, !save.is_zero()),
    }
}

fn walk_rules(
    record: &ZoneRecord,
    rules: &[RuleRecord],
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    out: &mut Vec<EffectiveSpan>,
) -> Result<(), RuleError> {
    let out_of_range = || RuleError::DateOutOfRange {
        zone: record.name.clone(),
        near: begin,
    };

    let first_year = begin.year().saturating_sub(1).max(MIN_YEAR);
    let last_year = end.year().saturating_add(1).min(MAX_YEAR);

    let mut firings: Vec<Firing<'_>> = (first_year..=last_year)
        .flat_map(|year| {
            rules
                .iter()
                .filter(move |rule| rule.applies_in(year))
                .filter_map(move |rule| {
                    rule.transition_in(year).map(|naive| Firing {
                        at: NominalTime::new(naive),
                        rule,
                    })
                })
        })
        .collect();
    firings.sort_by_key(|firing| firing.at);

    let base = record.gmt_offset;
    let year_start = NominalTime::start_of_year(first_year)
        .and_then(|start| start.resolve(base))
        .ok_or_else(out_of_range)?;
    let mut start = year_start.min(begin);
    // Nothing is in force until the first firing inside the walk, even if
    // an earlier year's rule would still apply.
    let mut active: Option<&RuleRecord> = None;

    for firing in firings {
        let offset = match firing.rule.at.clock {
            ClockReference::Universal => TimeDelta::zero(),
            ClockReference::LocalStandard => base,
            ClockReference::Wall | ClockReference::Unspecified => {
                let save = active.map_or(TimeDelta::zero(), |rule| rule.save);
                base.checked_add(&save).ok_or_else(out_of_range)?
            }
        };
        // A firing that resolves before the running start (two rules close
        // together around an offset change) collapses onto it.
        let boundary = firing.at.resolve(offset).ok_or_else(out_of_range)?.max(start);

        push_clipped(out, rule_span(record, active, start, boundary), begin, end);
        if boundary >= end {
            return Ok(());
        }
        active = Some(firing.rule);
        start = boundary;
    }

    push_clipped(out, rule_span(record, active, start, end), begin, end);
    Ok(())
}

/// Clip `span` to `[begin, end)` and keep it only if something is left.
fn push_clipped(out: &mut Vec<EffectiveSpan>, mut span: EffectiveSpan, begin: DateTime<Utc>, end: DateTime<Utc>) {
    span.begin = span.begin.max(begin);
    span.end = span.end.min(end);
    if span.begin < span.end {
        out.push(span);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use meridian_types::spans_tile_range;
    use meridian_tzdb::ZoneDatabaseBuilder;

    use super::*;

    const NORTHAMERICA: &str = "\
# Rule\tNAME\tFROM\tTO\t-\tIN\tON\tAT\tSAVE\tLETTER
Rule\tUS\t1918\t1919\t-\tMar\tlastSun\t2:00\t1:00\tD
Rule\tUS\t1918\t1919\t-\tOct\tlastSun\t2:00\t0\tS
Rule\tUS\t1942\tonly\t-\tFeb\t9\t2:00\t1:00\tW # War
Rule\tUS\t1945\tonly\t-\tAug\t14\t23:00u\t1:00\tP # Peace
Rule\tUS\t1945\tonly\t-\tSep\t30\t2:00\t0\tS
Rule\tUS\t1967\t2006\t-\tOct\tlastSun\t2:00\t0\tS
Rule\tUS\t1967\t1973\t-\tApr\tlastSun\t2:00\t1:00\tD
Rule\tUS\t1974\tonly\t-\tJan\t6\t2:00\t1:00\tD
Rule\tUS\t1975\tonly\t-\tFeb\tlastSun\t2:00\t1:00\tD
Rule\tUS\t1976\t1986\t-\tApr\tlastSun\t2:00\t1:00\tD
Rule\tUS\t1987\t2006\t-\tApr\tSun>=1\t2:00\t1:00\tD
Rule\tUS\t2007\tmax\t-\tMar\tSun>=8\t2:00\t1:00\tD
Rule\tUS\t2007\tmax\t-\tNov\tSun>=1\t2:00\t0\tS

Rule\tNYC\t1920\tonly\t-\tMar\tlastSun\t2:00\t1:00\tD
Rule\tNYC\t1920\tonly\t-\tOct\tlastSun\t2:00\t0\tS
Rule\tNYC\t1921\t1966\t-\tApr\tlastSun\t2:00\t1:00\tD
Rule\tNYC\t1921\t1954\t-\tSep\tlastSun\t2:00\t0\tS
Rule\tNYC\t1955\t1966\t-\tOct\tlastSun\t2:00\t0\tS

Zone America/New_York\t-4:56:02 -\tLMT\t1883 Nov 18 17:00u
\t\t\t-5:00\tUS\tE%sT\t1920
\t\t\t-5:00\tNYC\tE%sT\t1942
\t\t\t-5:00\tUS\tE%sT\t1946
\t\t\t-5:00\tNYC\tE%sT\t1967
\t\t\t-5:00\tUS\tE%sT

Zone America/Los_Angeles -7:52:58 -\tLMT\t1883 Nov 18 20:00u
\t\t\t-8:00\tUS\tP%sT\t1946
\t\t\t-8:00\tCA\tP%sT\t1967
\t\t\t-8:00\tUS\tP%sT

Zone Etc/Plain\t0:00\t-\tGMT
Zone Test/Fixed\t1:00\t1:00\tTST
Zone Test/Paired\t0:00\tUS\tGMT/BST
";

    fn database() -> ZoneDatabase {
        let mut builder = ZoneDatabaseBuilder::new();
        assert!(builder.ingest_source("northamerica", NORTHAMERICA).is_ok());
        builder.finish()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap_or_default()
    }

    fn spans(zone: &str, begin: DateTime<Utc>, end: DateTime<Utc>) -> Vec<EffectiveSpan> {
        let db = database();
        RuleEngine::new(&db).spans(zone, begin, end).unwrap_or_default()
    }

    fn summary(spans: &[EffectiveSpan]) -> Vec<(DateTime<Utc>, i64, String)> {
        spans
            .iter()
            .map(|s| (s.begin, s.dst_offset.num_minutes(), s.abbreviation.clone()))
            .collect()
    }

    #[test]
    fn spring_forward_2024() {
        let (b, e) = (utc(2024, 3, 9, 0), utc(2024, 3, 11, 0));
        let result = spans("America/New_York", b, e);
        assert!(spans_tile_range(&result, b, e));
        assert_eq!(
            summary(&result),
            vec![(b, 0, "EST".to_owned()), (utc(2024, 3, 10, 7), 60, "EDT".to_owned())]
        );
        assert!(result.iter().all(|s| s.gmt_offset == TimeDelta::hours(-5)));
    }

    #[test]
    fn fall_back_2024() {
        let (b, e) = (utc(2024, 11, 2, 0), utc(2024, 11, 4, 0));
        let result = spans("America/New_York", b, e);
        assert!(spans_tile_range(&result, b, e));
        assert_eq!(
            summary(&result),
            vec![(b, 60, "EDT".to_owned()), (utc(2024, 11, 3, 6), 0, "EST".to_owned())]
        );
    }

    #[test]
    fn universal_clock_firing() {
        let (b, e) = (utc(1945, 8, 1, 0), utc(1945, 10, 31, 0));
        let result = spans("America/New_York", b, e);
        assert!(spans_tile_range(&result, b, e));
        assert_eq!(
            summary(&result),
            vec![
                (b, 0, "ET".to_owned()),
                (utc(1945, 8, 14, 23), 60, "EPT".to_owned()),
                (utc(1945, 9, 30, 6), 0, "EST".to_owned()),
            ]
        );
    }

    #[test]
    fn walk_starts_with_no_active_rule() {
        // The 1942-1946 record is entered in 1945. The walk only sees 1944
        // onward, so the 1942 war rule is not carried in.
        let (b, e) = (utc(1945, 1, 1, 0), utc(1945, 2, 1, 0));
        let result = spans("America/New_York", b, e);
        assert_eq!(summary(&result), vec![(b, 0, "ET".to_owned())]);

        // A window that reaches back into 1942 does see it.
        let (b, e) = (utc(1943, 1, 1, 0), utc(1943, 2, 1, 0));
        let result = spans("America/New_York", b, e);
        assert_eq!(summary(&result), vec![(b, 60, "EWT".to_owned())]);
    }

    #[test]
    fn record_boundaries_split_spans() {
        let (b, e) = (utc(1883, 11, 1, 0), utc(1883, 12, 1, 0));
        let result = spans("America/New_York", b, e);
        assert!(spans_tile_range(&result, b, e));
        assert_eq!(result.len(), 2);
        assert_eq!(result.first().map(|s| s.abbreviation.as_str()), Some("LMT"));
        assert_eq!(result.get(1).map(|s| s.begin), Some(utc(1883, 11, 18, 17)));
    }

    #[test]
    fn empty_letter_before_first_rule() {
        let (b, e) = (utc(1900, 6, 1, 0), utc(1900, 6, 2, 0));
        let result = spans("America/Los_Angeles", b, e);
        assert_eq!(summary(&result), vec![(b, 0, "PT".to_owned())]);
    }

    #[test]
    fn undefined_rule_set_is_standard_time() {
        // The CA rules are not part of the fixture.
        let (b, e) = (utc(1950, 6, 1, 0), utc(1950, 6, 2, 0));
        let result = spans("America/Los_Angeles", b, e);
        assert_eq!(summary(&result), vec![(b, 0, "PT".to_owned())]);
        assert_eq!(result.first().map(|s| s.gmt_offset), Some(TimeDelta::hours(-8)));
    }

    #[test]
    fn zone_without_rules_is_one_span() {
        let (b, e) = (utc(1800, 1, 1, 0), utc(2100, 1, 1, 0));
        let result = spans("Etc/Plain", b, e);
        assert_eq!(summary(&result), vec![(b, 0, "GMT".to_owned())]);
        assert_eq!(result.first().map(|s| s.end), Some(e));
    }

    #[test]
    fn fixed_save_is_one_span() {
        let (b, e) = (utc(2000, 1, 1, 0), utc(2001, 1, 1, 0));
        let result = spans("Test/Fixed", b, e);
        assert_eq!(summary(&result), vec![(b, 60, "TST".to_owned())]);
    }

    #[test]
    fn paired_format_picks_by_save() {
        let (b, e) = (utc(2024, 6, 1, 0), utc(2024, 6, 2, 0));
        assert_eq!(summary(&spans("Test/Paired", b, e)), vec![(b, 60, "BST".to_owned())]);
        let (b, e) = (utc(2024, 1, 1, 0), utc(2024, 1, 2, 0));
        assert_eq!(summary(&spans("Test/Paired", b, e)), vec![(b, 0, "GMT".to_owned())]);
    }

    #[test]
    fn long_ranges_tile_exactly() {
        let db = database();
        let engine = RuleEngine::new(&db);
        for (zone, b, e) in [
            ("America/New_York", utc(1850, 1, 1, 0), utc(2050, 1, 1, 0)),
            ("America/New_York", utc(1966, 12, 31, 23), utc(1967, 1, 1, 1)),
            ("America/Los_Angeles", utc(1900, 1, 1, 0), utc(2030, 7, 1, 12)),
        ] {
            let result = engine.spans(zone, b, e).unwrap_or_default();
            assert!(spans_tile_range(&result, b, e), "{zone} {b} {e}");
        }
    }

    #[test]
    fn dst_alternates_in_modern_years() {
        let (b, e) = (utc(2010, 1, 1, 0), utc(2020, 1, 1, 0));
        let result = spans("America/New_York", b, e);
        // Ten years, two transitions each, plus the opening span.
        assert_eq!(result.len(), 21);
        assert!(result.windows(2).all(|pair| match pair {
            [a, b] => a.is_dst() != b.is_dst(),
            _ => true,
        }));
    }

    #[test]
    fn empty_range_and_unknown_zone() {
        let db = database();
        let engine = RuleEngine::new(&db);
        let t = utc(2024, 1, 1, 0);
        assert_eq!(engine.spans("America/New_York", t, t), Ok(Vec::new()));
        assert_eq!(
            engine.spans("Mars/Olympus_Mons", t, utc(2024, 1, 2, 0)),
            Err(RuleError::UnknownZone("Mars/Olympus_Mons".to_owned()))
        );
    }
}
