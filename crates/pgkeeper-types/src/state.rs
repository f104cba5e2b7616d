//! The local node FSM alphabet (§3, §4.3).

use std::fmt::{self, Display};

/// A local node's position in the failover finite state machine.
///
/// This is the complete alphabet named in §3: every state a node's
/// `reported_state`/`goal_state` pair can hold. Ordering has no semantic
/// meaning; it exists only so the type can be used as a `BTreeMap` key in
/// the transition dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeState {
    /// Pre-registration, no role yet.
    Unknown,
    /// Registered, not yet reconciled with the monitor's assignment.
    Init,
    /// Sole accepting-writes node in its group.
    Single,
    /// Accepting writes but insufficient standbys for quorum.
    WaitPrimary,
    /// Accepting writes with at least `number_sync_standbys` synchronous standbys.
    Primary,
    /// Promoting while other nodes are still being added.
    JoinPrimary,
    /// Applying a replication setting change, still in the primary role.
    ApplySettings,
    /// Primary preparing to enter maintenance.
    PrepareMaintenance,
    /// Primary waiting for maintenance window to open.
    WaitMaintenance,
    /// Under operator control, ignored by failover.
    Maintenance,
    /// Newly registered standby waiting to start catching up.
    WaitStandby,
    /// Standby catching up after creation or a prolonged disconnect.
    CatchingUp,
    /// Joining as a standby alongside other nodes being added.
    JoinSecondary,
    /// Standby, caught up, eligible to be promoted.
    Secondary,
    /// Chosen for promotion, flushing its WAL receiver.
    PreparePromotion,
    /// Promotion target has detached from the old primary; rewinding peers.
    StopReplication,
    /// Old primary, database stopped, awaiting instructions.
    Demoted,
    /// Primary that failed to confirm demotion within the deadline.
    DemoteTimeout,
    /// Primary being moved to maintenance; flushing standbys first.
    Draining,
    /// Post-crash probe: no primary known, node reports its flush LSN.
    ReportLsn,
    /// Standby being rewound to a new timeline.
    FastForward,
    /// Terminal: resources released.
    Dropped,
}

impl NodeState {
    /// All states in the alphabet, for exhaustive iteration in tests and
    /// for populating the dispatch table's domain.
    pub const ALL: &'static [NodeState] = &[
        NodeState::Unknown,
        NodeState::Init,
        NodeState::Single,
        NodeState::WaitPrimary,
        NodeState::Primary,
        NodeState::JoinPrimary,
        NodeState::ApplySettings,
        NodeState::PrepareMaintenance,
        NodeState::WaitMaintenance,
        NodeState::Maintenance,
        NodeState::WaitStandby,
        NodeState::CatchingUp,
        NodeState::JoinSecondary,
        NodeState::Secondary,
        NodeState::PreparePromotion,
        NodeState::StopReplication,
        NodeState::Demoted,
        NodeState::DemoteTimeout,
        NodeState::Draining,
        NodeState::ReportLsn,
        NodeState::FastForward,
        NodeState::Dropped,
    ];

    /// Whether a node in this state is currently accepting writes.
    ///
    /// Used to enforce I1 (at most one accepting-writes node per group) at
    /// call sites that need to reason about write availability without
    /// walking the full dispatch table.
    pub const fn accepts_writes(self) -> bool {
        matches!(
            self,
            NodeState::Single
                | NodeState::WaitPrimary
                | NodeState::Primary
                | NodeState::JoinPrimary
                | NodeState::ApplySettings
        )
    }

    /// Whether a node in this state counts as a standby eligible for
    /// promotion consideration by the assignment engine's election rule.
    pub const fn is_promotable_standby(self) -> bool {
        matches!(self, NodeState::Secondary)
    }

    /// Whether this state is a degraded, first-class (non-error) mode per §7.
    pub const fn is_degraded(self) -> bool {
        matches!(
            self,
            NodeState::WaitPrimary | NodeState::DemoteTimeout | NodeState::Dropped
        )
    }

    /// Whether this state is terminal: once reached, the node is gone.
    pub const fn is_terminal(self) -> bool {
        matches!(self, NodeState::Dropped)
    }

    /// The state's position in [`Self::ALL`], used as a compact on-disk
    /// code by the persistent per-node record (§4.1).
    pub fn code(self) -> u16 {
        Self::ALL
            .iter()
            .position(|&s| s == self)
            .expect("NodeState::ALL is exhaustive") as u16
    }

    /// Inverse of [`Self::code`].
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// A short machine name, the form used on the wire and in `show state`
    /// `--json` output (snake_case, matching the glossary's own spelling).
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeState::Unknown => "unknown",
            NodeState::Init => "init",
            NodeState::Single => "single",
            NodeState::WaitPrimary => "wait_primary",
            NodeState::Primary => "primary",
            NodeState::JoinPrimary => "join_primary",
            NodeState::ApplySettings => "apply_settings",
            NodeState::PrepareMaintenance => "prepare_maintenance",
            NodeState::WaitMaintenance => "wait_maintenance",
            NodeState::Maintenance => "maintenance",
            NodeState::WaitStandby => "wait_standby",
            NodeState::CatchingUp => "catchingup",
            NodeState::JoinSecondary => "join_secondary",
            NodeState::Secondary => "secondary",
            NodeState::PreparePromotion => "prepare_promotion",
            NodeState::StopReplication => "stop_replication",
            NodeState::Demoted => "demoted",
            NodeState::DemoteTimeout => "demote_timeout",
            NodeState::Draining => "draining",
            NodeState::ReportLsn => "report_lsn",
            NodeState::FastForward => "fast_forward",
            NodeState::Dropped => "dropped",
        }
    }
}

impl Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`NodeState`] from its wire string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized node state: {0:?}")]
pub struct ParseNodeStateError(String);

impl std::str::FromStr for NodeState {
    type Err = ParseNodeStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeState::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ParseNodeStateError(s.to_string()))
    }
}

/// The kind of node as registered with the monitor (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Standalone,
    Coordinator,
    Worker,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Standalone => "standalone",
            NodeKind::Coordinator => "coordinator",
            NodeKind::Worker => "worker",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_string() {
        for state in NodeState::ALL {
            let s = state.as_str();
            let parsed: NodeState = s.parse().unwrap();
            assert_eq!(parsed, *state);
        }
    }

    #[test]
    fn exactly_one_accepting_writes_family_per_primary_track() {
        // Sanity check on I1's vocabulary: degraded-but-still-primary states
        // accept writes, secondaries never do.
        assert!(NodeState::WaitPrimary.accepts_writes());
        assert!(!NodeState::Secondary.accepts_writes());
        assert!(!NodeState::CatchingUp.accepts_writes());
    }

    #[test]
    fn dropped_is_the_only_terminal_state() {
        let terminal: Vec<_> = NodeState::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&NodeState::Dropped]);
    }

    #[test]
    fn unknown_state_string_fails_to_parse() {
        assert!("not_a_state".parse::<NodeState>().is_err());
    }

    #[test]
    fn code_roundtrips_for_every_state() {
        for state in NodeState::ALL {
            assert_eq!(NodeState::from_code(state.code()), Some(*state));
        }
    }
}
