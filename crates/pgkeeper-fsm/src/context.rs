//! Inputs a dispatch handler sees, and what it hands back (§4.3).

use std::time::Duration;

use pgkeeper_types::{
    CandidatePriority, FormationSettings, Health, Lsn, NodeIdentity, PeerNode, Timestamp,
    TimelineId,
};
use pgkeeper_store::InitialDiskState;

use crate::effects::Effect;

/// Everything a pure transition handler needs to decide what to do next.
///
/// Built fresh by the node-active loop on every cycle from the persisted
/// node record, the monitor's known-nodes list, and a fresh read of local
/// Postgres state — never mutated in place, so handlers can't see stale
/// data from a previous cycle.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    pub node: NodeIdentity,
    pub candidate_priority: CandidatePriority,
    pub peers: Vec<PeerNode>,
    pub formation: FormationSettings,
    pub local_lsn: Lsn,
    pub local_timeline: TimelineId,
    /// The timeline a `fast_forward` should rewind onto, as decided by the
    /// monitor's election (§4.5). Unused outside that transition.
    pub target_timeline: TimelineId,
    pub disk_state: InitialDiskState,
    pub is_paused: bool,
    pub health: Health,
    /// Local Postgres observations from this cycle's `update_local_pg_state`
    /// (§4.3 step 2) — handlers never call [`crate::pg_controller::PgController`]
    /// directly, they read the snapshot taken at the top of the loop.
    pub pg_running: bool,
    pub pg_in_recovery: bool,
    /// This cycle's wall-clock reading, supplied by the caller rather than
    /// read internally so partition-timeout checks stay deterministic in
    /// tests (the same split the assignment engine's `DecisionClock` makes).
    pub now: Timestamp,
    /// The last time a `node_active` call to the monitor succeeded, if ever
    /// (§4.4). `None` before the first successful round-trip.
    pub last_monitor_contact: Option<Timestamp>,
    /// §4.3's `network_partition_timeout`: how long a write-accepting node
    /// tolerates losing contact with the monitor before demoting itself
    /// proactively to honor I1.
    pub network_partition_timeout: Duration,
    /// When `current_state` (as reported to `run_cycle`) was last entered,
    /// supplied by the caller rather than tracked here for the same
    /// determinism reason as `now`. Only consulted by states that bound
    /// their own wait locally, such as `prepare_promotion`.
    pub current_state_since: Timestamp,
    /// §4.3's `prepare_promotion_catchup`: maximum time a promotion target
    /// waits for pending WAL to be applied before giving up and promoting
    /// anyway.
    pub prepare_promotion_catchup: Duration,
    /// §4.3's `prepare_promotion_walreceiver`: maximum time `stop_replication`
    /// waits for the WAL receiver to disconnect.
    pub prepare_promotion_walreceiver: Duration,
}

impl TransitionContext {
    /// Peers other than this node, the set HBA and replication-slot
    /// maintenance diff against (§4.3).
    pub fn other_peers(&self) -> impl Iterator<Item = &PeerNode> {
        let self_id = self.node.id;
        self.peers.iter().filter(move |p| p.id != self_id)
    }
}

/// The result of dispatching one `(current, assigned)` pair: the state the
/// node should now report, and the effects needed to get there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub next_state: pgkeeper_types::NodeState,
    pub effects: Vec<Effect>,
}

impl TransitionOutcome {
    pub fn to(next_state: pgkeeper_types::NodeState) -> Self {
        Self {
            next_state,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}
