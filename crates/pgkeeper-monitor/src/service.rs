//! Ties one group's decision round to its persistence and notification
//! side effects (§4.5's closing line: "recorded in the ... `event` table
//! and published via NOTIFY ... in the same transaction that persists the
//! assignment").

use pgkeeper_types::GroupId;

use crate::assignment::{decide, Assignment, DecisionClock};
use crate::event::EventLog;
use crate::notify::{NotifyBus, StateChangeEvent};
use crate::report::GroupView;

/// Seam over wherever group views and assignments actually live. The real
/// monitor is itself a specialized database (§1); this trait is the same
/// kind of external-collaborator boundary `PgController` is for local
/// Postgres and `MonitorTransport` is for the wire RPCs.
///
/// `save_assignments` owns deriving `GroupView`'s persistent fields from the
/// plan it's given, the same way it derives `bootstrapped`: once any
/// assignment sends a node to `prepare_promotion`, that node becomes
/// `failover_winner` for every subsequent round until its own assignment
/// reaches `wait_primary`, at which point it's cleared back to `None`. A
/// `manual_failover_requested` flag set by `perform_failover` is consumed
/// (cleared) the first round a `failover_winner` is derived from it.
pub trait GroupStore: Send + Sync {
    fn load(&self, group_id: GroupId) -> Option<GroupView>;
    fn save_assignments(&mut self, group_id: GroupId, assignments: &[Assignment]);
}

/// Runs one decision round for `group_id`: loads the view, decides, and
/// for every node whose goal actually changed, appends an event and
/// publishes a notification before persisting the new assignment —
/// matching the spec's "same transaction" ordering as closely as a
/// synchronous in-process call sequence can.
///
/// Returns `None` if the group isn't known to the store.
pub fn run_round(
    store: &mut dyn GroupStore,
    events: &mut dyn EventLog,
    notify: &NotifyBus,
    group_id: GroupId,
    clock: DecisionClock,
) -> Option<Vec<Assignment>> {
    let view = store.load(group_id)?;
    let plan = decide(&view, clock);

    for assignment in &plan {
        let reported = view
            .nodes
            .iter()
            .find(|n| n.node_id == assignment.node_id)
            .map(|n| n.reported_state);
        let Some(reported_state) = reported else {
            continue;
        };
        if reported_state == assignment.goal_state {
            continue;
        }

        events.record(
            clock.now,
            pgkeeper_types::FormationName::new(view.formation.clone()),
            group_id,
            assignment.node_id,
            reported_state,
            assignment.goal_state,
            format!("assigned {}", assignment.goal_state),
        );
        notify.publish(StateChangeEvent {
            node_id: assignment.node_id,
            state: assignment.goal_state,
        });
    }

    store.save_assignments(group_id, &plan);
    Some(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InMemoryEventLog;
    use crate::report::NodeReport;
    use pgkeeper_types::{
        CandidatePriority, FormationSettings, Health, Lsn, NodeId, NodeState, TimelineId, Timestamp,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    struct InMemoryGroupStore {
        views: HashMap<GroupId, GroupView>,
    }

    impl GroupStore for InMemoryGroupStore {
        fn load(&self, group_id: GroupId) -> Option<GroupView> {
            self.views.get(&group_id).cloned()
        }

        fn save_assignments(&mut self, group_id: GroupId, assignments: &[Assignment]) {
            if let Some(view) = self.views.get_mut(&group_id) {
                for assignment in assignments {
                    if let Some(node) = view.nodes.iter_mut().find(|n| n.node_id == assignment.node_id) {
                        node.reported_state = assignment.goal_state;
                    }
                }
                if assignments
                    .iter()
                    .any(|a| matches!(a.goal_state, NodeState::Single | NodeState::Primary))
                {
                    view.bootstrapped = true;
                }
                if let Some(promoted) = assignments
                    .iter()
                    .find(|a| a.goal_state == NodeState::PreparePromotion)
                {
                    view.failover_winner = Some(promoted.node_id);
                    view.manual_failover_requested = false;
                }
                if let Some(winner_id) = view.failover_winner {
                    if assignments
                        .iter()
                        .any(|a| a.node_id == winner_id && a.goal_state == NodeState::WaitPrimary)
                    {
                        view.failover_winner = None;
                    }
                }
            }
        }
    }

    fn node(id: u64, state: NodeState) -> NodeReport {
        NodeReport {
            node_id: NodeId::new(id),
            reported_state: state,
            reported_lsn: Lsn::new(0),
            reported_tli: TimelineId::INITIAL,
            reported_at: Timestamp::from_secs(100),
            health: Health::Healthy,
            health_at: Timestamp::from_secs(100),
            candidate_priority: CandidatePriority::DEFAULT,
            replication_quorum: true,
            maintenance_requested: false,
            removal_requested: false,
        }
    }

    fn clock() -> DecisionClock {
        DecisionClock {
            now: Timestamp::from_secs(100),
            node_active_deadline: Duration::from_secs(40),
            health_deadline: Duration::from_secs(30),
            report_lsn_deadline: Duration::from_secs(60),
            allowed_lag_bytes: crate::assignment::DEFAULT_ALLOWED_LAG_BYTES,
        }
    }

    #[test]
    fn bootstrap_round_records_one_event_and_notifies() {
        let group_id = GroupId::new(1);
        let view = GroupView {
            formation: "default".to_string(),
            group_id,
            settings: FormationSettings::default(),
            nodes: vec![node(1, NodeState::Init)],
            bootstrapped: false,
            failover_winner: None,
            manual_failover_requested: false,
        };
        let mut store = InMemoryGroupStore {
            views: HashMap::from([(group_id, view)]),
        };
        let mut events = InMemoryEventLog::new();
        let notify = NotifyBus::default();
        let mut rx = notify.subscribe();

        let plan = run_round(&mut store, &mut events, &notify, group_id, clock()).unwrap();
        assert_eq!(plan[0].goal_state, NodeState::Single);
        assert_eq!(events.since(0).len(), 1, "exactly the one real state change was logged");

        let delivered = rx.try_recv().unwrap();
        assert_eq!(delivered.state, NodeState::Single);

        assert!(store.views[&group_id].bootstrapped);
    }

    #[test]
    fn unknown_group_returns_none() {
        let mut store = InMemoryGroupStore {
            views: HashMap::new(),
        };
        let mut events = InMemoryEventLog::new();
        let notify = NotifyBus::default();
        assert!(run_round(&mut store, &mut events, &notify, GroupId::new(9), clock()).is_none());
    }
}
