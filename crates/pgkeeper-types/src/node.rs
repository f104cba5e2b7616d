//! Node identity and peer/health bookkeeping shared by the keeper and monitor.

use std::fmt;
use std::time::{Duration, SystemTime};

use crate::ids::{FormationName, GroupId, NodeId};
use crate::state::NodeKind;

/// Per-node integer used as the primary election key (0..100); 0 excludes
/// the node from promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct CandidatePriority(u8);

impl CandidatePriority {
    pub const EXCLUDED: CandidatePriority = CandidatePriority(0);
    pub const DEFAULT: CandidatePriority = CandidatePriority(50);

    /// Clamps to the documented 0..=100 range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn excludes_promotion(self) -> bool {
        self.0 == 0
    }
}

impl Default for CandidatePriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A monotonic timestamp used for `reported_at`/`health_at`/contact fields.
///
/// Stored as seconds since `UNIX_EPOCH` so it is plain bit-copyable for the
/// state store's fixed-size record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Elapsed time since this timestamp was recorded, relative to `now`.
    /// Saturates to zero if `now` predates `self` (clock skew).
    pub fn elapsed_since(self, now: Timestamp) -> Duration {
        Duration::from_secs(now.0.saturating_sub(self.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health as observed by the monitor's independent TCP probe (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Health {
    Healthy,
    Unhealthy,
    /// Not probed yet (just registered).
    Unknown,
}

/// Static identity of a node as recorded by the monitor at registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeIdentity {
    pub id: NodeId,
    pub formation: FormationName,
    pub group_id: GroupId,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub kind: NodeKind,
}

impl NodeIdentity {
    pub fn host_port(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A peer as seen by another node's keeper (`get_other_nodes`, §4.4).
///
/// This is the shape the FSM's HBA maintenance and replication-slot
/// reconciliation diff against the monitor's known-nodes list (§4.3).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PeerNode {
    pub id: NodeId,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub group_id: GroupId,
    pub candidate_priority: CandidatePriority,
    pub replication_quorum: bool,
}

impl PeerNode {
    pub fn slot_name(&self) -> String {
        format!("pg_keeper_{}", self.id.get())
    }
}
