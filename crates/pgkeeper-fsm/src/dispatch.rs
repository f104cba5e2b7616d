//! The `(current, assigned)` lookup table (§9): "a two-dimensional lookup
//! table indexed by the two enum values with a shared handler signature."
//!
//! Handlers are plain `fn(&TransitionContext) -> TransitionOutcome` — pure
//! and synchronous, so they fit in one `HashMap` without boxing futures.
//! Not every one of the 22×22 pairs is registered: §4.3 only specifies
//! representative transitions, and an unregistered pair is a protocol
//! error, not a silent no-op.

use std::collections::HashMap;

use pgkeeper_types::NodeState;

use crate::context::{TransitionContext, TransitionOutcome};
use crate::error::FsmError;
use crate::recovery::ensure_current_state;
use crate::transitions;

type TransitionFn = fn(&TransitionContext) -> TransitionOutcome;

/// Origin states from which a wildcard `report_lsn`/`maintenance`/`dropped`/
/// `stop_replication` transition is registered. Kept to the operating
/// states that can plausibly receive these assignments; anything outside
/// this set that the monitor somehow assigns falls through to
/// [`FsmError::UnhandledTransition`].
const OPERATING_STATES: &[NodeState] = &[
    NodeState::Single,
    NodeState::WaitPrimary,
    NodeState::Primary,
    NodeState::CatchingUp,
    NodeState::Secondary,
    NodeState::WaitMaintenance,
    NodeState::Maintenance,
];

/// The dispatch table: every `(current, assigned)` pair this node can act
/// on, built once and reused across node-active cycles.
pub struct DispatchTable {
    handlers: HashMap<(NodeState, NodeState), TransitionFn>,
}

impl DispatchTable {
    pub fn build() -> Self {
        let mut handlers: HashMap<(NodeState, NodeState), TransitionFn> = HashMap::new();

        handlers.insert((NodeState::Init, NodeState::Single), transitions::init_to_single);
        handlers.insert(
            (NodeState::Single, NodeState::WaitPrimary),
            transitions::single_to_wait_primary,
        );
        handlers.insert(
            (NodeState::WaitPrimary, NodeState::Primary),
            transitions::wait_primary_to_primary,
        );
        handlers.insert(
            (NodeState::Primary, NodeState::PrepareMaintenance),
            transitions::primary_to_prepare_maintenance,
        );
        handlers.insert(
            (NodeState::Secondary, NodeState::PrepareMaintenance),
            transitions::secondary_to_prepare_maintenance,
        );
        handlers.insert(
            (NodeState::Primary, NodeState::Draining),
            transitions::primary_to_draining,
        );
        handlers.insert(
            (NodeState::CatchingUp, NodeState::Secondary),
            transitions::catchingup_to_secondary,
        );
        handlers.insert(
            (NodeState::Secondary, NodeState::PreparePromotion),
            transitions::secondary_to_prepare_promotion,
        );
        handlers.insert(
            (NodeState::PreparePromotion, NodeState::StopReplication),
            transitions::prepare_promotion_to_stop_replication,
        );
        handlers.insert(
            (NodeState::Secondary, NodeState::FastForward),
            transitions::secondary_to_fast_forward,
        );
        handlers.insert(
            (NodeState::Maintenance, NodeState::CatchingUp),
            transitions::maintenance_to_catchingup,
        );

        // A failover's losing side runs report_lsn (the old primary, once it
        // comes back) or any operating state (the other standbys) through
        // stop_replication → fast_forward → catchingup; the winner runs
        // report_lsn or secondary → prepare_promotion → stop_replication →
        // wait_primary. None of those origins fit the 22×22 table's
        // representative-transitions list above, so they're registered here
        // alongside the other wildcards.
        handlers.insert(
            (NodeState::ReportLsn, NodeState::StopReplication),
            transitions::any_to_stop_replication,
        );
        handlers.insert(
            (NodeState::ReportLsn, NodeState::PreparePromotion),
            transitions::secondary_to_prepare_promotion,
        );
        handlers.insert(
            (NodeState::StopReplication, NodeState::FastForward),
            transitions::secondary_to_fast_forward,
        );
        handlers.insert(
            (NodeState::StopReplication, NodeState::WaitPrimary),
            transitions::stop_replication_to_wait_primary,
        );
        handlers.insert(
            (NodeState::FastForward, NodeState::CatchingUp),
            transitions::fast_forward_to_catchingup,
        );

        for &origin in OPERATING_STATES {
            handlers.insert((origin, NodeState::ReportLsn), transitions::any_to_report_lsn);
            handlers.insert((origin, NodeState::Maintenance), transitions::any_to_maintenance);
            handlers.insert((origin, NodeState::Dropped), transitions::any_to_dropped);
            handlers.insert(
                (origin, NodeState::StopReplication),
                transitions::any_to_stop_replication,
            );
        }

        Self { handlers }
    }

    /// Looks up and runs the handler for `(current, assigned)`. When they're
    /// equal there's no transition to make — falls through to
    /// [`ensure_current_state`] instead.
    pub fn dispatch(
        &self,
        current: NodeState,
        assigned: NodeState,
        ctx: &TransitionContext,
    ) -> Result<TransitionOutcome, FsmError> {
        if current == assigned {
            return Ok(ensure_current_state(current, ctx));
        }

        match self.handlers.get(&(current, assigned)) {
            Some(handler) => Ok(handler(ctx)),
            None => Err(FsmError::UnhandledTransition { current, assigned }),
        }
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgkeeper_store::InitialDiskState;
    use pgkeeper_types::{
        CandidatePriority, FormationName, FormationSettings, GroupId, Health, Lsn, NodeId,
        NodeIdentity, NodeKind, TimelineId,
    };

    fn ctx() -> TransitionContext {
        TransitionContext {
            node: NodeIdentity {
                id: NodeId::new(1),
                formation: FormationName::new("default"),
                group_id: GroupId::new(0),
                name: "n1".to_string(),
                host: "localhost".to_string(),
                port: 5432,
                kind: NodeKind::Standalone,
            },
            candidate_priority: CandidatePriority::DEFAULT,
            peers: Vec::new(),
            formation: FormationSettings::default(),
            local_lsn: Lsn::ZERO,
            local_timeline: TimelineId::INITIAL,
            target_timeline: TimelineId::INITIAL,
            disk_state: InitialDiskState::PgdataEmpty,
            is_paused: false,
            health: Health::Healthy,
            pg_running: false,
            pg_in_recovery: false,
            now: pgkeeper_types::Timestamp::from_secs(100),
            last_monitor_contact: None,
            network_partition_timeout: std::time::Duration::from_secs(20),
            current_state_since: pgkeeper_types::Timestamp::from_secs(100),
            prepare_promotion_catchup: std::time::Duration::from_secs(30),
            prepare_promotion_walreceiver: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn registered_pair_dispatches() {
        let table = DispatchTable::build();
        let outcome = table
            .dispatch(NodeState::Init, NodeState::Single, &ctx())
            .expect("init -> single is registered");
        assert_eq!(outcome.next_state, NodeState::Single);
    }

    #[test]
    fn maintenance_window_drives_secondary_through_wait_maintenance() {
        let table = DispatchTable::build();
        let prepare = table
            .dispatch(NodeState::Secondary, NodeState::PrepareMaintenance, &ctx())
            .expect("secondary -> prepare_maintenance is registered");
        assert_eq!(prepare.next_state, NodeState::WaitMaintenance);

        let finish = table
            .dispatch(NodeState::WaitMaintenance, NodeState::Maintenance, &ctx())
            .expect("wait_maintenance -> maintenance is registered");
        assert_eq!(finish.next_state, NodeState::Maintenance);
    }

    #[test]
    fn unregistered_pair_is_an_error() {
        let table = DispatchTable::build();
        let err = table
            .dispatch(NodeState::Single, NodeState::PreparePromotion, &ctx())
            .unwrap_err();
        assert!(matches!(err, FsmError::UnhandledTransition { .. }));
    }

    #[test]
    fn equal_current_and_assigned_runs_recovery_instead() {
        let table = DispatchTable::build();
        let outcome = table
            .dispatch(NodeState::Primary, NodeState::Primary, &ctx())
            .expect("same-state dispatch always succeeds");
        assert_eq!(outcome.next_state, NodeState::Primary);
        assert_eq!(outcome.effects, vec![crate::effects::Effect::StartPostgres]);
    }
}
