//! Line-level parser for tz source files (`northamerica`, `europe`, ...).
//!
//! Lines the parser does not understand are skipped with a `warn!`
//! diagnostic. Malformed time, offset and date content inside an otherwise
//! well-formed line is a hard [`TzdbError::Format`].

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use meridian_types::to_fixed_offset;
use tracing::{debug, warn};

use crate::error::TzdbError;
use crate::fields::{self, FieldError};
use crate::model::{ClockReference, RuleRecord, RuleReference, ZoneLink, ZoneRecord};

/// Maximum number of whitespace-separated UNTIL tokens.
const MAX_UNTIL_TOKENS: usize = 4;

/// Records of one zone as they appeared under a single `Zone` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneBlock {
    /// Zone name from the header line.
    pub name: String,
    /// The header record followed by its continuation records.
    pub records: Vec<ZoneRecord>,
}

/// Everything parsed out of one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSource {
    /// Zone blocks in source order.
    pub zones: Vec<ZoneBlock>,
    /// Rule records in source order.
    pub rules: Vec<RuleRecord>,
    /// Links in source order.
    pub links: Vec<ZoneLink>,
    /// Number of non-blank lines that were skipped.
    pub skipped_lines: usize,
}

/// Parse one tz source.
///
/// `source_name` is only used in diagnostics and errors.
///
/// # Errors
///
/// Returns [`TzdbError::Format`] when an UNTIL, AT, SAVE, ON or GMT offset
/// field cannot be parsed.
pub fn parse_source(source_name: &str, text: &str) -> Result<ParsedSource, TzdbError> {
    let mut parser = SourceParser {
        source_name,
        line: 0,
        parsed: ParsedSource::default(),
    };

    // Index into `parsed.zones` of the block continuation lines extend.
    let mut current: Option<usize> = None;

    for (index, raw) in text.lines().enumerate() {
        parser.line = index.saturating_add(1);

        if raw.trim().is_empty() {
            current = None;
            continue;
        }
        let content = raw.split_once('#').map_or(raw, |(before, _)| before).trim_end();
        let tokens: Vec<&str> = content.split_whitespace().collect();
        let Some(&keyword) = tokens.first() else {
            // Comment-only line: zone blocks may be interleaved with comments.
            continue;
        };

        if content.starts_with(char::is_whitespace) {
            let Some(name) = current
                .and_then(|i| parser.parsed.zones.get(i))
                .map(|block| block.name.clone())
            else {
                parser.skip("continuation line with no zone to continue");
                continue;
            };
            if let Some(record) = parser.zone_record(&name, &tokens)? {
                if let Some(block) = current.and_then(|i| parser.parsed.zones.get_mut(i)) {
                    block.records.push(record);
                }
            }
            continue;
        }

        if fields::is_abbreviation(keyword, "rule", 1) {
            current = None;
            if let Some(rule) = parser.rule_record(&tokens)? {
                parser.parsed.rules.push(rule);
            }
        } else if fields::is_abbreviation(keyword, "zone", 1) {
            current = None;
            let [_, name, rest @ ..] = tokens.as_slice() else {
                parser.skip("zone line without a name");
                continue;
            };
            if let Some(record) = parser.zone_record(name, rest)? {
                parser.parsed.zones.push(ZoneBlock {
                    name: (*name).to_owned(),
                    records: vec![record],
                });
                current = Some(parser.parsed.zones.len().saturating_sub(1));
            }
        } else if fields::is_abbreviation(keyword, "link", 1) {
            current = None;
            match tokens.as_slice() {
                [_, target, alias] => parser.parsed.links.push(ZoneLink {
                    target: (*target).to_owned(),
                    alias: (*alias).to_owned(),
                }),
                _ => parser.skip("link line needs exactly a target and an alias"),
            }
        } else {
            parser.skip("unknown line keyword");
        }
    }

    let parsed = parser.parsed;
    debug!(
        source = source_name,
        zones = parsed.zones.len(),
        rules = parsed.rules.len(),
        links = parsed.links.len(),
        skipped = parsed.skipped_lines,
        "parsed tz source"
    );
    Ok(parsed)
}

struct SourceParser<'a> {
    source_name: &'a str,
    line: usize,
    parsed: ParsedSource,
}

impl SourceParser<'_> {
    fn skip(&mut self, reason: &str) {
        warn!(source = self.source_name, line = self.line, reason, "skipping tz source line");
        self.parsed.skipped_lines = self.parsed.skipped_lines.saturating_add(1);
    }

    fn format_error(&self, field: &'static str, value: &str) -> TzdbError {
        TzdbError::Format {
            source_name: self.source_name.to_owned(),
            line: self.line,
            field,
            value: value.to_owned(),
        }
    }

    /// Any failure in a field that fixes a record's meaning aborts the
    /// source, unknown names included.
    fn required<T>(&self, result: Result<T, FieldError>, field: &'static str, value: &str) -> Result<T, TzdbError> {
        result.map_err(|_error| self.format_error(field, value))
    }

    /// `GMTOFF RULES FORMAT [UNTIL...]`, shared by zone and continuation
    /// lines.
    fn zone_record(&mut self, name: &str, tokens: &[&str]) -> Result<Option<ZoneRecord>, TzdbError> {
        let [gmt_offset, rules, format, until @ ..] = tokens else {
            self.skip("zone line needs GMTOFF, RULES and FORMAT");
            return Ok(None);
        };
        if until.len() > MAX_UNTIL_TOKENS {
            self.skip("too many UNTIL fields");
            return Ok(None);
        }

        let gmt_offset = self.required(fields::parse_hms(gmt_offset), "GMTOFF", gmt_offset)?;
        let rules = self.required(fields::parse_rule_reference(rules), "RULES", rules)?;

        let until = if until.is_empty() {
            None
        } else {
            let joined = until.join(" ");
            let (local, clock) = self.required(fields::parse_until(until), "UNTIL", &joined)?;
            let instant = until_instant(local, clock, gmt_offset, &rules)
                .ok_or_else(|| self.format_error("UNTIL", &joined))?;
            Some(instant)
        };

        Ok(Some(ZoneRecord {
            name: name.to_owned(),
            gmt_offset,
            rules,
            format: (*format).to_owned(),
            until,
        }))
    }

    /// `Rule NAME FROM TO TYPE IN ON AT SAVE LETTER`.
    fn rule_record(&mut self, tokens: &[&str]) -> Result<Option<RuleRecord>, TzdbError> {
        let [_, name, from, to, kind, month, day, at, save, letter] = tokens else {
            self.skip("rule line needs ten fields");
            return Ok(None);
        };

        let Ok(from_year) = fields::parse_from_year(from) else {
            self.skip("unrecognised FROM year");
            return Ok(None);
        };
        let Ok(to_year) = fields::parse_to_year(to, from_year) else {
            self.skip("unrecognised TO year");
            return Ok(None);
        };
        if *kind != "-" {
            self.skip("rule TYPE column is not supported");
            return Ok(None);
        }
        let month = self.required(fields::parse_month(month), "IN", month)?;
        let day = self.required(fields::parse_day(day), "ON", day)?;
        let at = self.required(fields::parse_time_of_day(at), "AT", at)?;
        let save = self.required(fields::parse_save(save), "SAVE", save)?;

        Ok(Some(RuleRecord {
            name: (*name).to_owned(),
            from: from_year,
            to: to_year,
            month,
            day,
            at,
            save,
            letter: if *letter == "-" { String::new() } else { (*letter).to_owned() },
        }))
    }
}

/// Convert a local UNTIL time to UTC.
///
/// Universal times are taken as-is, standard times at the base offset, and
/// wall-clock times at the base offset plus the record's fixed save if it
/// has one. Offsets are rounded to the minute first.
fn until_instant(
    local: NaiveDateTime,
    clock: ClockReference,
    gmt_offset: TimeDelta,
    rules: &RuleReference,
) -> Option<DateTime<Utc>> {
    let offset = match clock {
        ClockReference::Universal => TimeDelta::zero(),
        ClockReference::LocalStandard => gmt_offset,
        ClockReference::Wall | ClockReference::Unspecified => match rules {
            RuleReference::FixedSave(save) => gmt_offset.checked_add(save)?,
            RuleReference::None | RuleReference::Named(_) => gmt_offset,
        },
    };
    to_fixed_offset(offset)
        .from_local_datetime(&local)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
}
