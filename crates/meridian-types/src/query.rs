//! Local-time query results.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::geo::GeoCoordinate;
use crate::offset::serde_seconds;

/// The answer to "what civil time is it at this place / in this zone?".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The queried instant re-expressed at the resolved total offset.
    pub local_time: DateTime<FixedOffset>,
    /// Base offset from UTC.
    #[serde(with = "serde_seconds")]
    pub gmt_offset: TimeDelta,
    /// Daylight saving amount in effect.
    #[serde(with = "serde_seconds")]
    pub dst_offset: TimeDelta,
    /// Name of the zone that answered the query (`GMT+3` for mariner's time).
    pub zone_name: String,
    /// Abbreviation in effect, e.g. `EDT`.
    pub abbreviation: String,
    /// The coordinate that was queried, or the zone's reference coordinate
    /// for queries made by name.
    pub query_coordinate: Option<GeoCoordinate>,
    /// The coordinate the zone is anchored to, when the zone has metadata.
    pub reference_coordinate: Option<GeoCoordinate>,
}

impl QueryResult {
    /// Base offset plus DST save.
    pub fn total_offset(&self) -> TimeDelta {
        self.gmt_offset
            .checked_add(&self.dst_offset)
            .unwrap_or(self.gmt_offset)
    }
}
