//! Precondition/postcondition recovery (§4.3): re-asserts the invariants a
//! node's current role implies, independent of whatever transition is
//! being attempted this cycle.
//!
//! Called whenever the monitor's assigned state equals the node's current
//! state — there's no transition to dispatch, but drift (a crashed
//! postmaster, a standby that fell out of recovery) still needs correcting.

use pgkeeper_types::NodeState;

use crate::context::{TransitionContext, TransitionOutcome};
use crate::effects::Effect;

/// Checks `current`'s invariants against this cycle's Postgres observations
/// and returns corrective effects if they've drifted.
pub fn ensure_current_state(current: NodeState, ctx: &TransitionContext) -> TransitionOutcome {
    let outcome = TransitionOutcome::to(current);

    match current {
        NodeState::Single | NodeState::WaitPrimary | NodeState::Primary => {
            if !ctx.pg_running {
                return outcome.with_effect(Effect::StartPostgres);
            }
        }
        NodeState::Secondary | NodeState::CatchingUp => {
            if !ctx.pg_running {
                return outcome.with_effect(Effect::StartPostgres);
            }
            if !ctx.pg_in_recovery {
                // Running but not in recovery: this standby was promoted out
                // from under the FSM (manual intervention, crash recovery
                // gone wrong). Nothing safe to do locally — report up and
                // let the monitor's assignment engine reconcile it.
            }
        }
        NodeState::Maintenance | NodeState::Demoted => {
            if ctx.pg_running {
                return outcome.with_effect(Effect::StopPostgresSmart);
            }
        }
        NodeState::Dropped => {
            // Terminal: no invariant left to hold.
        }
        NodeState::PreparePromotion => {
            // §4.3: bounded by `prepare_promotion_catchup`. Caught up already,
            // or waited long enough that further waiting isn't worth it
            // either way promote now rather than block the group forever.
            let waited_long_enough =
                ctx.current_state_since.elapsed_since(ctx.now) >= ctx.prepare_promotion_catchup;
            if !ctx.pg_in_recovery || waited_long_enough {
                return TransitionOutcome::to(NodeState::StopReplication)
                    .with_effect(Effect::PromoteInPlace);
            }
        }
        _ => {}
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgkeeper_store::InitialDiskState;
    use pgkeeper_types::{
        CandidatePriority, FormationName, FormationSettings, GroupId, Health, Lsn, NodeId,
        NodeIdentity, NodeKind, TimelineId,
    };

    fn ctx(pg_running: bool, pg_in_recovery: bool) -> TransitionContext {
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
            pg_running,
            pg_in_recovery,
            now: pgkeeper_types::Timestamp::from_secs(100),
            last_monitor_contact: None,
            network_partition_timeout: std::time::Duration::from_secs(20),
            current_state_since: pgkeeper_types::Timestamp::from_secs(100),
            prepare_promotion_catchup: std::time::Duration::from_secs(30),
            prepare_promotion_walreceiver: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn primary_with_postgres_down_gets_restarted() {
        let outcome = ensure_current_state(NodeState::Primary, &ctx(false, false));
        assert_eq!(outcome.next_state, NodeState::Primary);
        assert_eq!(outcome.effects, vec![Effect::StartPostgres]);
    }

    #[test]
    fn healthy_primary_is_a_no_op() {
        let outcome = ensure_current_state(NodeState::Primary, &ctx(true, false));
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn maintenance_with_postgres_up_gets_stopped() {
        let outcome = ensure_current_state(NodeState::Maintenance, &ctx(true, false));
        assert_eq!(outcome.effects, vec![Effect::StopPostgresSmart]);
    }

    #[test]
    fn dropped_never_emits_effects() {
        let outcome = ensure_current_state(NodeState::Dropped, &ctx(true, true));
        assert!(outcome.effects.is_empty());
    }
}
