//! The assignment engine's pure decision core (§4.5): given one group's
//! current view, compute every node's goal state for this round.
//!
//! Deliberately kept free of `tokio`/the store/the transport — it takes a
//! `GroupView` snapshot and a clock reading and returns a plan, the same
//! separation `pgkeeper-fsm`'s dispatch table keeps between deciding and
//! doing.

use std::collections::BTreeSet;
use std::time::Duration;

use pgkeeper_types::{NodeId, NodeState, TimelineId, Timestamp};

use crate::election::elect;
use crate::report::{GroupView, NodeReport};

/// Default allowed replay lag (§4.5 rule 6) before a quorum-participating
/// secondary is pulled back into `catchingup`. No teacher/spec constant
/// names this in bytes; 16 MiB mirrors a conservative single-WAL-segment
/// budget and is surfaced as a knob rather than hidden, so callers can
/// override it per formation.
pub const DEFAULT_ALLOWED_LAG_BYTES: u64 = 16 * 1024 * 1024;

/// Clock and tunables the decision needs that don't live on `GroupView`
/// itself (deadlines are operational knobs, not per-group state).
#[derive(Debug, Clone, Copy)]
pub struct DecisionClock {
    pub now: Timestamp,
    pub node_active_deadline: Duration,
    pub health_deadline: Duration,
    pub report_lsn_deadline: Duration,
    pub allowed_lag_bytes: u64,
}

/// One node's computed goal for this round. `target_timeline` is set only
/// by the failover rule, carrying the winner's post-promotion timeline for
/// every node being fast-forwarded onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub node_id: NodeId,
    pub goal_state: NodeState,
    pub target_timeline: Option<TimelineId>,
}

impl Assignment {
    fn noop(node_id: NodeId, reported_state: NodeState) -> Self {
        Self {
            node_id,
            goal_state: reported_state,
            target_timeline: None,
        }
    }

    fn to(node_id: NodeId, goal_state: NodeState) -> Self {
        Self {
            node_id,
            goal_state,
            target_timeline: None,
        }
    }
}

/// Computes the goal state of every node in `group` for this round,
/// applying §4.5's eight rules in order. Nodes matched by an earlier rule
/// are excluded from every later rule in the same round (rule 1's
/// "exclude it from all other rules for the rest of this decision round"
/// generalizes cleanly to every other exclusive match).
pub fn decide(group: &GroupView, clock: DecisionClock) -> Vec<Assignment> {
    let mut decided: Vec<Assignment> = Vec::with_capacity(group.nodes.len());
    let mut settled: BTreeSet<NodeId> = BTreeSet::new();

    // Rule 1: paused/maintenance. A primary or secondary still holding its
    // role is routed through `prepare_maintenance` first so the FSM runs
    // the handler that drains it safely (for a primary: waits out its
    // synchronous standbys); a node already past that step (`wait_maintenance`)
    // or with no such handler at all is driven straight to `maintenance`.
    for node in &group.nodes {
        if node.maintenance_requested {
            let goal = match node.reported_state {
                NodeState::Primary | NodeState::Secondary => NodeState::PrepareMaintenance,
                _ => NodeState::Maintenance,
            };
            decided.push(Assignment::to(node.node_id, goal));
            settled.insert(node.node_id);
        }
    }

    let remaining = |settled: &BTreeSet<NodeId>| -> Vec<&NodeReport> {
        group
            .nodes
            .iter()
            .filter(|n| !settled.contains(&n.node_id))
            .collect()
    };

    // Rule 2: bootstrap. Only meaningful once, before any node has ever
    // reached single/primary; afterwards this rule never fires again for
    // this group even if every node is momentarily down.
    if !group.bootstrapped {
        if let Some(first) = remaining(&settled)
            .into_iter()
            .min_by_key(|n| n.node_id)
        {
            decided.push(Assignment::to(first.node_id, NodeState::Single));
            settled.insert(first.node_id);
        }
        // Everything else sits out this round: promotion, quorum, and
        // failover all presuppose a bootstrapped group.
        for node in remaining(&settled) {
            decided.push(Assignment::noop(node.node_id, node.reported_state));
        }
        return decided;
    }

    // "Primary" here means any node on the accepting-writes track (I1):
    // `single`, `wait_primary`, or `primary` all stand in for the group's
    // one write target depending on how far bootstrap/quorum has gotten.
    // During an in-flight failover this is `None` from the second round on
    // (the old primary has already moved off the accepting-writes track and
    // the winner hasn't reached it yet), which is exactly why continuing a
    // failover can't be driven off this variable the way detecting one is.
    let primary = remaining(&settled)
        .into_iter()
        .find(|n| n.reported_state.accepts_writes());

    // Rule 5, continuing an in-flight failover: a failover already has a
    // winner once it's `failover_winner` on the group, and is driven to
    // completion here regardless of whether `primary` can still be found —
    // re-deriving "is there still a failure" from scratch on round two would
    // never re-enter this rule, since by then nothing satisfies
    // `accepts_writes()` for the split-brain check below to even run
    // against (§4.5 rule 5, P5).
    if let Some(winner_id) = group.failover_winner {
        decide_failover(group, clock, &mut decided, &mut settled, primary, Some(winner_id));
        return decided;
    }

    // Rule 5, detecting a new failover: either the primary has gone missing
    // and unhealthy, or an operator has forced the issue with
    // `perform_failover` even though the primary is still healthy (§4.5 rule
    // 5's "explicit `perform_failover`" clause). Either way, run before the
    // steady-state rules below since a failover supersedes quorum/lag
    // bookkeeping for every surviving node this round.
    //
    // Split-brain prevention: the automatic path never promotes while the
    // existing primary is still reporting `primary`/`single` and healthy;
    // an explicit request overrides that by design.
    let primary_failed = match primary {
        Some(p) => {
            p.is_missing(clock.now, clock.node_active_deadline)
                && !p.is_healthy(clock.now, clock.health_deadline)
        }
        None => false,
    };
    if primary_failed || group.manual_failover_requested {
        let any_secondary_healthy = remaining(&settled).iter().any(|n| {
            n.reported_state == NodeState::Secondary && n.is_healthy(clock.now, clock.health_deadline)
        });
        if any_secondary_healthy {
            decide_failover(group, clock, &mut decided, &mut settled, primary, None);
            return decided;
        }
    }

    // Rule 3: add standby. Also resumes a node that just finished rewinding
    // onto a new timeline (`fast_forward`) once the failover that sent it
    // there has otherwise closed out — a loser can still be mid-rewind for
    // a round or two after `failover_winner` itself has cleared.
    if primary.is_some() {
        for node in remaining(&settled) {
            let goal = match node.reported_state {
                NodeState::Init => Some(NodeState::WaitStandby),
                NodeState::WaitStandby => Some(NodeState::CatchingUp),
                NodeState::FastForward => Some(NodeState::CatchingUp),
                _ => None,
            };
            if let Some(goal) = goal {
                decided.push(Assignment::to(node.node_id, goal));
                settled.insert(node.node_id);
            }
        }
    }

    // Rule 3, continued: a standby that has caught up to within
    // `allowed_lag_bytes` graduates to `secondary` — the state rule 4's
    // quorum count and rule 5's election pool both depend on ("eligible
    // secondaries reporting secondary"); without this no standby can ever
    // leave `catchingup`.
    if let Some(p) = primary {
        for node in remaining(&settled) {
            if node.reported_state == NodeState::CatchingUp
                && node.reported_lsn.lag_behind(p.reported_lsn) <= clock.allowed_lag_bytes
            {
                decided.push(Assignment::to(node.node_id, NodeState::Secondary));
                settled.insert(node.node_id);
            }
        }
    }

    // Rule 4: reach and maintain quorum (I5). A node on the accepting-writes
    // track moves down to `wait_primary` the instant its eligible quorum
    // (secondaries reporting `secondary` with `replication_quorum` set)
    // drops below `number_sync_standbys`, and climbs back up through
    // `apply_settings` to `primary` once quorum is restored.
    if let Some(p) = primary {
        if !settled.contains(&p.node_id) {
            let eligible_secondaries = remaining(&settled)
                .iter()
                .filter(|n| n.reported_state == NodeState::Secondary && n.replication_quorum)
                .count() as u32;
            let quorum_met = eligible_secondaries >= group.settings.number_sync_standbys;

            let goal = match p.reported_state {
                NodeState::Single | NodeState::Primary if !quorum_met => {
                    Some(NodeState::WaitPrimary)
                }
                NodeState::WaitPrimary if quorum_met => Some(NodeState::ApplySettings),
                NodeState::ApplySettings => Some(NodeState::Primary),
                _ => None,
            };
            if let Some(goal) = goal {
                decided.push(Assignment::to(p.node_id, goal));
                settled.insert(p.node_id);
            }
        }
    }

    // Rule 6: secondary falling behind.
    if let Some(p) = primary {
        for node in remaining(&settled) {
            if node.reported_state == NodeState::Secondary
                && node.replication_quorum
                && node.reported_lsn.lag_behind(p.reported_lsn) > clock.allowed_lag_bytes
            {
                decided.push(Assignment::to(node.node_id, NodeState::CatchingUp));
                settled.insert(node.node_id);
            }
        }
    }

    // Rule 7: drop.
    for node in remaining(&settled) {
        if node.removal_requested {
            let goal = match node.reported_state {
                NodeState::Draining => NodeState::Dropped,
                _ => NodeState::Draining,
            };
            decided.push(Assignment::to(node.node_id, goal));
            settled.insert(node.node_id);
        }
    }

    // Rule 8: no-op, for everyone nothing else matched.
    for node in remaining(&settled) {
        decided.push(Assignment::noop(node.node_id, node.reported_state));
    }

    decided
}

/// Rule 5's body. On the round a failure (or `perform_failover`) is first
/// detected, `existing_winner` is `None` and this elects one among healthy,
/// quorum-eligible secondaries. On every later round, while
/// `group.failover_winner` is still set, `existing_winner` carries that
/// choice forward instead of re-electing — this function then just advances
/// the winner and every other node one step further along the failover
/// path.
///
/// Exhaustive over every unsettled node: `decide` returns immediately after
/// calling this, so unlike the steady-state rules there's no trailing no-op
/// pass to fall back on.
fn decide_failover(
    group: &GroupView,
    clock: DecisionClock,
    decided: &mut Vec<Assignment>,
    settled: &mut BTreeSet<NodeId>,
    primary: Option<&NodeReport>,
    existing_winner: Option<NodeId>,
) {
    if let Some(p) = primary {
        if p.reported_state != NodeState::ReportLsn {
            decided.push(Assignment::to(p.node_id, NodeState::ReportLsn));
            settled.insert(p.node_id);
        }
    }

    let winner_id = existing_winner.or_else(|| elect_winner(group, clock, decided, settled));

    let Some(winner_id) = winner_id else {
        // Every candidate was stale or unhealthy; nothing safe to elect
        // this round. Everyone not yet settled holds at report_lsn.
        for node in group.nodes.iter().filter(|n| !settled.contains(&n.node_id)) {
            decided.push(Assignment::to(node.node_id, NodeState::ReportLsn));
            settled.insert(node.node_id);
        }
        return;
    };

    // The winner may have been dropped from the group entirely mid-failover
    // (an operator's `perform_node_removal`); nothing left to drive.
    let Some(winner_timeline) = group
        .nodes
        .iter()
        .find(|n| n.node_id == winner_id)
        .map(|n| n.reported_tli)
    else {
        return;
    };
    let new_timeline = winner_timeline.next();

    for node in group.nodes.iter().filter(|n| !settled.contains(&n.node_id)) {
        let goal = if node.node_id == winner_id {
            match node.reported_state {
                NodeState::PreparePromotion => NodeState::StopReplication,
                NodeState::StopReplication => NodeState::WaitPrimary,
                s if s.accepts_writes() => s, // already exited the failover track this round
                _ => NodeState::PreparePromotion,
            }
        } else if existing_winner.is_none() {
            // The failover just started: every other node detaches from the
            // old primary this round, however far along its own state was.
            match node.reported_state {
                NodeState::StopReplication => NodeState::FastForward,
                _ => NodeState::StopReplication,
            }
        } else {
            // Continuing: only nudge nodes still on the detach/rewind path
            // forward. One already back at `secondary`/`catchingup` (e.g. a
            // node that joined after the failover began) just holds until
            // the winner exits the failover track.
            match node.reported_state {
                NodeState::FastForward => NodeState::CatchingUp,
                NodeState::StopReplication => NodeState::FastForward,
                NodeState::CatchingUp | NodeState::Secondary => node.reported_state,
                _ => NodeState::StopReplication,
            }
        };
        decided.push(Assignment {
            node_id: node.node_id,
            goal_state: goal,
            target_timeline: Some(new_timeline),
        });
        settled.insert(node.node_id);
    }
}

/// The one-time election among healthy, quorum-eligible secondaries that
/// picks a failover's winner. Candidates too stale to trust their LSN are
/// parked in `maintenance` rather than left blocking the round.
fn elect_winner(
    group: &GroupView,
    clock: DecisionClock,
    decided: &mut Vec<Assignment>,
    settled: &mut BTreeSet<NodeId>,
) -> Option<NodeId> {
    let candidates: Vec<&NodeReport> = group
        .nodes
        .iter()
        .filter(|n| {
            !settled.contains(&n.node_id)
                && n.replication_quorum
                && n.is_healthy(clock.now, clock.health_deadline)
                && matches!(
                    n.reported_state,
                    NodeState::Secondary | NodeState::ReportLsn
                )
        })
        .collect();

    let (reporters, stale): (Vec<&NodeReport>, Vec<&NodeReport>) = candidates
        .into_iter()
        .partition(|n| !n.is_missing(clock.now, clock.report_lsn_deadline));

    for node in &stale {
        decided.push(Assignment::to(node.node_id, NodeState::Maintenance));
        settled.insert(node.node_id);
    }

    elect(&reporters).map(|result| result.winner)
}
