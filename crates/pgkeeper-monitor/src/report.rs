//! Per-node bookkeeping the assignment engine reasons over (§4.5).

use pgkeeper_types::{
    CandidatePriority, FormationSettings, GroupId, Health, Lsn, NodeId, NodeState, TimelineId,
    Timestamp,
};

/// Everything the monitor knows about one node in a group, refreshed on
/// every `node_active` call and by the independent health-probe job.
#[derive(Debug, Clone)]
pub struct NodeReport {
    pub node_id: NodeId,
    pub reported_state: NodeState,
    pub reported_lsn: Lsn,
    pub reported_tli: TimelineId,
    pub reported_at: Timestamp,
    pub health: Health,
    pub health_at: Timestamp,
    pub candidate_priority: CandidatePriority,
    pub replication_quorum: bool,
    /// Operator requested maintenance on this node (rule 1).
    pub maintenance_requested: bool,
    /// Operator requested removal of this node (rule 7).
    pub removal_requested: bool,
}

impl NodeReport {
    /// A node is `missing` once its last report is older than
    /// `NodeActiveDeadline`, independent of what the health probe saw.
    pub fn is_missing(&self, now: Timestamp, node_active_deadline: std::time::Duration) -> bool {
        self.reported_at.elapsed_since(now) > node_active_deadline
    }

    /// A node is `healthy` if the independent TCP probe succeeded within
    /// `HealthDeadline`.
    pub fn is_healthy(&self, now: Timestamp, health_deadline: std::time::Duration) -> bool {
        self.health == Health::Healthy && self.health_at.elapsed_since(now) <= health_deadline
    }
}

/// One replication group's full state, the unit the assignment engine
/// decides over (§4.5: "for each group").
#[derive(Debug, Clone)]
pub struct GroupView {
    pub formation: String,
    pub group_id: GroupId,
    pub settings: FormationSettings,
    pub nodes: Vec<NodeReport>,
    /// Whether any node in this group has ever reached `single` or
    /// `primary`. Persistent monitor-side knowledge, not re-derivable from
    /// the current snapshot alone — a group mid-failover may momentarily
    /// have no node reporting either state without being unbootstrapped.
    pub bootstrapped: bool,
    /// The node a failover already in progress is promoting, if any.
    /// Persistent monitor-side knowledge like `bootstrapped`: once the old
    /// primary's reported state stops satisfying `accepts_writes()`, nothing
    /// in a fresh snapshot says a failover is under way, so the store
    /// carries this across rounds until the winner reaches `wait_primary`
    /// (§4.5 rule 5).
    pub failover_winner: Option<NodeId>,
    /// Set by an operator's `perform_failover` call (§4.5 rule 5's "explicit
    /// `perform_failover`" clause). Consulted alongside the automatic
    /// missing-primary detection so a failover can be forced even while the
    /// current primary is healthy; the store clears it once `decide` has
    /// consumed it into a `failover_winner`.
    pub manual_failover_requested: bool,
}

impl GroupView {
    pub fn primary(&self) -> Option<&NodeReport> {
        self.nodes
            .iter()
            .find(|n| matches!(n.reported_state, NodeState::Primary | NodeState::Single))
    }

    pub fn secondaries_reporting(&self, state: NodeState) -> impl Iterator<Item = &NodeReport> {
        self.nodes.iter().filter(move |n| n.reported_state == state)
    }
}
