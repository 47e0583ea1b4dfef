//! Query range for expansion, with the final overlap test.

use chrono::{DateTime, ParseError, Utc};

/// Half-open query range `[start, end)` for one expansion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        QueryRange { start, end }
    }

    /// Build a range from the ISO-8601 instant strings the request layer
    /// hands over.
    pub fn from_iso(start: &str, end: &str) -> Result<Self, ParseError> {
        Ok(QueryRange {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Whether an instance `[instance_start, instance_end]` overlaps this
    /// range: `instance_start < end && instance_end > start`.
    ///
    /// An instance ending exactly at `start` does not overlap. Applied once
    /// per instance, after override merging, because an override may have
    /// moved the instance relative to the range.
    pub fn overlaps(&self, instance_start: DateTime<Utc>, instance_end: DateTime<Utc>) -> bool {
        instance_start < self.end && instance_end > self.start
    }
}
