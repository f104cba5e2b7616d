//! The node-active loop (§4.3): the async imperative shell driving the
//! pure dispatch table against a real [`PgController`] and monitor link.
//!
//! Each cycle:
//! 1. refresh the known-nodes list and this node's assigned state from the
//!    monitor;
//! 2. observe local Postgres state;
//! 3. build a [`TransitionContext`] snapshot;
//! 4. dispatch (or run recovery, if current == assigned);
//! 5. execute the returned effects and persist the resulting state;
//! 6. sleep, interruptible by a signal/notification wakeup.

use std::time::Duration;

use pgkeeper_types::{Health, Lsn, NodeState, PeerNode, TimelineId};

use crate::context::TransitionContext;
use crate::dispatch::DispatchTable;
use crate::effects::Effect;
use crate::error::FsmError;
use crate::hba;
use crate::pg_controller::PgController;
use crate::replication_slots;

/// The polling interval between node-active cycles absent a wakeup (§4.3).
pub const NODE_ACTIVE_INTERVAL: Duration = Duration::from_secs(5);

/// What the monitor reports back for this node on a `node_active` call.
#[derive(Debug, Clone)]
pub struct NodeActiveReport {
    pub assigned_state: NodeState,
    pub peers: Vec<PeerNode>,
    pub target_timeline: TimelineId,
}

/// Abstraction over the monitor RPCs the node-active loop needs (§4.4).
///
/// Defined here rather than depended on from `pgkeeper-client` so the
/// dependency edge runs client → fsm, not the reverse; `pgkeeper-client`'s
/// `MonitorClient` implements this trait.
#[async_trait::async_trait]
pub trait MonitorLink: Send + Sync {
    /// Reports this node's current state and local progress, and receives
    /// back the monitor's assignment plus the other nodes it should know
    /// about. Idempotent: safe to retry on failure (§4.4).
    async fn node_active(
        &self,
        current_state: NodeState,
        lsn: Lsn,
        timeline: TimelineId,
        is_in_recovery: bool,
        health: Health,
    ) -> Result<NodeActiveReport, FsmError>;
}

/// Runs one node-active cycle: refresh, observe, dispatch, execute, persist.
///
/// Returns the state that was persisted this cycle so the caller can log
/// or test against it without re-deriving it from the controller.
pub async fn run_cycle(
    monitor: &dyn MonitorLink,
    controller: &mut dyn PgController,
    table: &DispatchTable,
    mut ctx: TransitionContext,
    previous_state: NodeState,
) -> Result<NodeState, FsmError> {
    let (lsn, timeline) = controller.current_progress();
    ctx.local_lsn = lsn;
    ctx.local_timeline = timeline;
    ctx.pg_running = controller.is_running();
    ctx.pg_in_recovery = controller.is_in_recovery();

    if previous_state.accepts_writes() && has_lost_the_monitor(&ctx) {
        if ctx.pg_running {
            controller.stop_smart().map_err(FsmError::Controller)?;
        }
        return Ok(NodeState::Demoted);
    }

    let report = monitor
        .node_active(previous_state, lsn, timeline, ctx.pg_in_recovery, ctx.health)
        .await?;
    ctx.peers = report.peers;
    ctx.target_timeline = report.target_timeline;

    let outcome = table.dispatch(previous_state, report.assigned_state, &ctx)?;

    for effect in &outcome.effects {
        execute(controller, effect)?;
    }

    reconcile_replication(controller, &ctx)?;
    reconcile_hba(controller, &ctx)?;

    Ok(outcome.next_state)
}

/// §4.3's partition-safety check: true once a write-accepting node has gone
/// `network_partition_timeout` without a successful monitor round-trip.
/// Never true before the first round-trip (`last_monitor_contact` is
/// `None`) — a node that has never reached the monitor isn't "partitioned
/// from" it, it just hasn't started yet.
fn has_lost_the_monitor(ctx: &TransitionContext) -> bool {
    match ctx.last_monitor_contact {
        Some(last_contact) => last_contact.elapsed_since(ctx.now) > ctx.network_partition_timeout,
        None => false,
    }
}

/// Carries out one effect against the local controller.
fn execute(controller: &mut dyn PgController, effect: &Effect) -> Result<(), FsmError> {
    match effect {
        Effect::Bootstrap => controller.bootstrap(),
        Effect::StartPostgres => controller.start(),
        Effect::StopPostgresSmart => controller.stop_smart(),
        Effect::StopPostgresFast => controller.stop_fast(),
        Effect::PromoteInPlace => controller.promote(),
        Effect::StopReplication { timeout } => controller.stop_replication(*timeout),
        Effect::FastForward { target_timeline } => controller.fast_forward(*target_timeline),
        Effect::CreateReplicationSlot { peer } => {
            controller.create_replication_slot(&peer.slot_name())
        }
        Effect::DropReplicationSlot { slot_name } => {
            controller.drop_replication_slot(slot_name)
        }
        Effect::AdvanceReplicationSlot {
            slot_name,
            restart_lsn,
        } => controller.advance_replication_slot(slot_name, *restart_lsn),
        Effect::ApplyHba { entries } => {
            let rendered: Vec<String> = entries.iter().map(hba::hba_entry).collect();
            controller.apply_hba(&rendered)
        }
        Effect::ReloadPostgresConfig => controller.reload_config(),
        Effect::ApplySynchronousStandbyNames { names } => {
            controller.apply_synchronous_standby_names(names)
        }
        Effect::EnsureSynchronousStandbysCaughtUp => {
            controller.wait_for_synchronous_standbys_caught_up()
        }
        Effect::RemoveLocalState => controller.remove_local_state(),
    }
    .map_err(FsmError::Controller)
}

/// Diffs the known-nodes list against existing slots every cycle,
/// independent of whatever transition just ran (§4.3).
fn reconcile_replication(
    controller: &mut dyn PgController,
    ctx: &TransitionContext,
) -> Result<(), FsmError> {
    let peers: Vec<PeerNode> = ctx.other_peers().cloned().collect();
    let existing = controller.replication_slots();

    for effect in replication_slots::reconcile(&peers, &existing) {
        execute(controller, &effect)?;
    }

    let flush_lsns: Vec<(String, Lsn)> = controller
        .replication_slots()
        .into_iter()
        .filter_map(|slot| controller.replica_flush_lsn(&slot).map(|lsn| (slot, lsn)))
        .collect();
    for effect in replication_slots::advance(&flush_lsns) {
        execute(controller, &effect)?;
    }

    Ok(())
}

/// Diffs and reloads `pg_hba.conf` every cycle, independent of the
/// transition just run (§4.3).
fn reconcile_hba(controller: &mut dyn PgController, ctx: &TransitionContext) -> Result<(), FsmError> {
    let peers: Vec<PeerNode> = ctx.other_peers().cloned().collect();
    let current = controller.current_hba_entries();

    if let Some(diff) = hba::reconcile(&peers, &current) {
        controller.apply_hba(&diff).map_err(FsmError::Controller)?;
        controller.reload_config().map_err(FsmError::Controller)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgkeeper_store::InitialDiskState;
    use pgkeeper_types::{
        CandidatePriority, FormationName, FormationSettings, GroupId, Health, NodeIdentity,
        NodeKind, NodeId,
    };

    use crate::dispatch::DispatchTable;
    use crate::pg_controller::InMemoryPgController;

    /// Always fails, simulating a monitor that can't be reached — used to
    /// prove the partition-timeout check never even calls through once it
    /// has already decided to self-demote.
    struct UnreachableMonitor;

    #[async_trait::async_trait]
    impl MonitorLink for UnreachableMonitor {
        async fn node_active(
            &self,
            _current_state: NodeState,
            _lsn: Lsn,
            _timeline: TimelineId,
            _is_in_recovery: bool,
            _health: Health,
        ) -> Result<NodeActiveReport, FsmError> {
            Err(FsmError::MonitorLink("unreachable".to_string()))
        }
    }

    fn ctx(now_secs: u64, last_contact_secs: Option<u64>) -> TransitionContext {
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
            now: pgkeeper_types::Timestamp::from_secs(now_secs),
            last_monitor_contact: last_contact_secs.map(pgkeeper_types::Timestamp::from_secs),
            network_partition_timeout: Duration::from_secs(20),
            current_state_since: pgkeeper_types::Timestamp::from_secs(now_secs),
            prepare_promotion_catchup: Duration::from_secs(30),
            prepare_promotion_walreceiver: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn primary_demotes_itself_after_losing_the_monitor_too_long() {
        let monitor = UnreachableMonitor;
        let mut controller = InMemoryPgController::new();
        controller.running = true;
        let table = DispatchTable::build();

        let next = run_cycle(
            &monitor,
            &mut controller,
            &table,
            ctx(100, Some(50)),
            NodeState::Primary,
        )
        .await
        .expect("self-demotion short-circuits before the failing monitor call");

        assert_eq!(next, NodeState::Demoted);
        assert!(!controller.running, "a proactive demotion stops postgres");
    }

    #[tokio::test]
    async fn primary_within_the_partition_timeout_still_calls_the_monitor() {
        let monitor = UnreachableMonitor;
        let mut controller = InMemoryPgController::new();
        controller.running = true;
        let table = DispatchTable::build();

        let err = run_cycle(
            &monitor,
            &mut controller,
            &table,
            ctx(100, Some(95)),
            NodeState::Primary,
        )
        .await
        .expect_err("still within the timeout, so the unreachable monitor call surfaces");

        assert!(matches!(err, FsmError::MonitorLink(_)));
    }

    #[tokio::test]
    async fn secondary_never_self_demotes_on_partition() {
        let monitor = UnreachableMonitor;
        let mut controller = InMemoryPgController::new();
        let table = DispatchTable::build();

        let err = run_cycle(
            &monitor,
            &mut controller,
            &table,
            ctx(100, Some(0)),
            NodeState::Secondary,
        )
        .await
        .expect_err("only write-accepting nodes self-demote on partition");

        assert!(matches!(err, FsmError::MonitorLink(_)));
    }
}
