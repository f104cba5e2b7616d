//! Log-sequence-number and timeline newtypes used as election tiebreakers.

use std::fmt::{self, Display};
use std::ops::Sub;

/// A write-ahead-log flush position, monotonically increasing within a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Lsn(u64);

impl Lsn {
    pub const ZERO: Lsn = Lsn(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Saturating distance between two LSNs, for lag computations (I6).
    pub fn lag_behind(self, other: Lsn) -> u64 {
        other.0.saturating_sub(self.0)
    }
}

impl Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Mimic Postgres' conventional %X/%X rendering.
        write!(f, "{:X}/{:X}", self.0 >> 32, self.0 & 0xFFFF_FFFF)
    }
}

impl Sub for Lsn {
    type Output = u64;

    fn sub(self, rhs: Lsn) -> u64 {
        self.0.saturating_sub(rhs.0)
    }
}

impl From<u64> for Lsn {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A replication timeline identifier. Bumped by one on every promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct TimelineId(u32);

impl TimelineId {
    pub const INITIAL: TimelineId = TimelineId(1);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The timeline a node moves to after being promoted out of this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `(timeline, lsn)` ordered as the election comparator of §4.5 requires:
/// highest timeline wins, ties broken by highest LSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ReplicationProgress {
    pub timeline: TimelineId,
    pub lsn: Lsn,
}

impl ReplicationProgress {
    pub const fn new(timeline: TimelineId, lsn: Lsn) -> Self {
        Self { timeline, lsn }
    }
}
