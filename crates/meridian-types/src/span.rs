//! Effective spans: maximal intervals with one offset/DST/abbreviation.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::offset::{serde_seconds, to_fixed_offset};

/// A half-open interval `[begin, end)` during which one GMT offset, one DST
/// save and one abbreviation apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSpan {
    /// First instant covered by the span.
    pub begin: DateTime<Utc>,
    /// First instant no longer covered by the span.
    pub end: DateTime<Utc>,
    /// Base offset from UTC, as written in the source data.
    #[serde(with = "serde_seconds")]
    pub gmt_offset: TimeDelta,
    /// Daylight saving amount added on top of the base offset.
    #[serde(with = "serde_seconds")]
    pub dst_offset: TimeDelta,
    /// Rendered abbreviation, e.g. `EST` or `EDT`.
    pub abbreviation: String,
}

impl EffectiveSpan {
    /// Base offset plus DST save, unrounded.
    pub fn total_offset(&self) -> TimeDelta {
        self.gmt_offset
            .checked_add(&self.dst_offset)
            .unwrap_or(self.gmt_offset)
    }

    /// The total offset as a [`FixedOffset`], rounded to the minute.
    pub fn fixed_offset(&self) -> FixedOffset {
        to_fixed_offset(self.total_offset())
    }

    /// Whether `instant` falls inside `[begin, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.begin <= instant && instant < self.end
    }

    /// Whether a non-zero DST save is in effect.
    pub fn is_dst(&self) -> bool {
        !self.dst_offset.is_zero()
    }
}

impl core::fmt::Display for EffectiveSpan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} => {} {} (dst {}s)",
            self.begin.to_rfc3339(),
            self.end.to_rfc3339(),
            self.abbreviation,
            self.dst_offset.num_seconds()
        )
    }
}

/// Check that `spans` tile `[begin, end)` exactly: ascending, contiguous,
/// non-empty, and starting/ending on the range bounds.
///
/// An empty range is tiled only by an empty list.
pub fn spans_tile_range(spans: &[EffectiveSpan], begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    if begin >= end {
        return spans.is_empty();
    }
    let mut cursor = begin;
    for span in spans {
        if span.begin != cursor || span.end <= span.begin {
            return false;
        }
        cursor = span.end;
    }
    cursor == end
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn span(begin: u32, end: u32, dst_hours: i64) -> EffectiveSpan {
        EffectiveSpan {
            begin: at(begin),
            end: at(end),
            gmt_offset: TimeDelta::hours(-5),
            dst_offset: TimeDelta::hours(dst_hours),
            abbreviation: if dst_hours == 0 { "EST" } else { "EDT" }.to_owned(),
        }
    }

    #[test]
    fn total_offset_adds_save() {
        let s = span(0, 1, 1);
        assert_eq!(s.total_offset(), TimeDelta::hours(-4));
        assert_eq!(s.fixed_offset().local_minus_utc(), -4 * 3600);
        assert!(s.is_dst());
    }

    #[test]
    fn containment_is_half_open() {
        let s = span(2, 5, 0);
        assert!(s.contains(at(2)));
        assert!(s.contains(at(4)));
        assert!(!s.contains(at(5)));
        assert!(!s.contains(at(1)));
    }

    #[test]
    fn tiling_detects_gaps_and_overlaps() {
        let good = vec![span(0, 3, 0), span(3, 7, 1), span(7, 9, 0)];
        assert!(spans_tile_range(&good, at(0), at(9)));

        let gap = vec![span(0, 3, 0), span(4, 9, 1)];
        assert!(!spans_tile_range(&gap, at(0), at(9)));

        let overlap = vec![span(0, 4, 0), span(3, 9, 1)];
        assert!(!spans_tile_range(&overlap, at(0), at(9)));

        let short = vec![span(0, 3, 0)];
        assert!(!spans_tile_range(&short, at(0), at(9)));
    }

    #[test]
    fn empty_range_requires_no_spans() {
        assert!(spans_tile_range(&[], at(3), at(3)));
        assert!(!spans_tile_range(&[span(3, 4, 0)], at(3), at(3)));
    }

    #[test]
    fn serializes_offsets_as_seconds() {
        let json = serde_json::to_value(span(0, 1, 1)).unwrap_or_default();
        assert_eq!(json["gmt_offset"], -18_000);
        assert_eq!(json["dst_offset"], 3_600);
        assert_eq!(json["abbreviation"], "EDT");
    }
}
