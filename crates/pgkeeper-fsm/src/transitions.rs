//! Handler contracts for the representative transitions of §4.3.
//!
//! Every function here is pure: `&TransitionContext` in, [`TransitionOutcome`]
//! out. They never touch Postgres, the filesystem, or the network — that's
//! the node-active loop's job, executing the returned [`Effect`]s.

use pgkeeper_types::NodeState;

use crate::context::{TransitionContext, TransitionOutcome};
use crate::effects::Effect;

/// `init → single`.
pub fn init_to_single(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::Single).with_effect(Effect::Bootstrap)
}

/// `single → wait_primary`. No direct action: new standbys are admitted
/// through the generic per-round-trip HBA reconciliation, not this handler.
pub fn single_to_wait_primary(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::WaitPrimary)
}

/// `wait_primary → primary`: wire up synchronous replication for the
/// standbys the monitor considers quorum participants, then reload.
pub fn wait_primary_to_primary(ctx: &TransitionContext) -> TransitionOutcome {
    let names: Vec<String> = ctx
        .other_peers()
        .filter(|p| p.replication_quorum)
        .map(|p| p.name.clone())
        .collect();

    TransitionOutcome::to(NodeState::Primary)
        .with_effect(Effect::ApplySynchronousStandbyNames { names })
        .with_effect(Effect::ReloadPostgresConfig)
}

/// `primary → prepare_maintenance`: block for standbys to catch up, then
/// move straight to `wait_maintenance` — there's nothing more for
/// `prepare_maintenance` itself to persist once that wait completes.
pub fn primary_to_prepare_maintenance(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::WaitMaintenance)
        .with_effect(Effect::EnsureSynchronousStandbysCaughtUp)
}

/// `secondary → prepare_maintenance`: nothing follows it, so move straight
/// to `wait_maintenance` too; unlike the primary there are no downstream
/// standbys to wait on.
pub fn secondary_to_prepare_maintenance(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::WaitMaintenance)
}

/// `primary → draining`: stop accepting writes, stop cleanly, and persist
/// `demoted` rather than `draining` — `draining` never outlives this call.
pub fn primary_to_draining(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::Demoted).with_effect(Effect::StopPostgresSmart)
}

/// `catchingup → secondary`: a standby only graduates once it is actually
/// streaming; otherwise it stays in `catchingup` for another cycle.
pub fn catchingup_to_secondary(ctx: &TransitionContext) -> TransitionOutcome {
    if ctx.pg_running && ctx.pg_in_recovery {
        TransitionOutcome::to(NodeState::Secondary)
    } else {
        TransitionOutcome::to(NodeState::CatchingUp)
    }
}

/// `secondary → prepare_promotion`: stop following the old primary, bounded
/// by `prepare_promotion_walreceiver` so a wedged WAL receiver can't stall
/// the promotion indefinitely.
pub fn secondary_to_prepare_promotion(ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::PreparePromotion).with_effect(Effect::StopReplication {
        timeout: ctx.prepare_promotion_walreceiver,
    })
}

/// `prepare_promotion → stop_replication`: promote in place.
pub fn prepare_promotion_to_stop_replication(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::StopReplication).with_effect(Effect::PromoteInPlace)
}

/// `secondary → fast_forward` (also used for `stop_replication →
/// fast_forward`, the losing side of a failover once it has detached from
/// the old primary): rewind onto the winner's new timeline. `fast_forward`'s
/// own contract covers restarting as a standby afterward, so there's no
/// separate start-postgres effect here.
pub fn secondary_to_fast_forward(ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::FastForward).with_effect(Effect::FastForward {
        target_timeline: ctx.target_timeline,
    })
}

/// `* → stop_replication`: detach from the old primary ahead of either a
/// rewind (losing side of a failover) or an in-place promotion. Distinct
/// from [`prepare_promotion_to_stop_replication`], which is the promotion
/// winner's path and additionally promotes; this is the generic "stop
/// following whoever I was following" step.
pub fn any_to_stop_replication(ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::StopReplication).with_effect(Effect::StopReplication {
        timeout: ctx.prepare_promotion_walreceiver,
    })
}

/// `stop_replication → wait_primary`: the failover winner has already
/// promoted in place (via [`prepare_promotion_to_stop_replication`]); this
/// just re-enters the normal primary-track quorum dance the monitor drives
/// it through from here (§4.5 rule 4).
pub fn stop_replication_to_wait_primary(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::WaitPrimary)
}

/// `fast_forward → catchingup`: the rewind landed on the new timeline and
/// restarted streaming; resume the normal catch-up tracking.
pub fn fast_forward_to_catchingup(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::CatchingUp)
}

/// `* → report_lsn`: quiesce enough to read the control file's flush LSN.
pub fn any_to_report_lsn(ctx: &TransitionContext) -> TransitionOutcome {
    let mut outcome = TransitionOutcome::to(NodeState::ReportLsn);
    if ctx.pg_running {
        outcome = outcome.with_effect(Effect::StopPostgresSmart);
    }
    outcome
}

/// `* → maintenance`: operator-requested pause.
pub fn any_to_maintenance(ctx: &TransitionContext) -> TransitionOutcome {
    let mut outcome = TransitionOutcome::to(NodeState::Maintenance);
    if ctx.pg_running {
        outcome = outcome.with_effect(Effect::StopPostgresSmart);
    }
    outcome
}

/// `maintenance → catchingup`: resume as a standby.
pub fn maintenance_to_catchingup(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::CatchingUp).with_effect(Effect::StartPostgres)
}

/// `* → dropped`: terminal, stop and clean up.
pub fn any_to_dropped(_ctx: &TransitionContext) -> TransitionOutcome {
    TransitionOutcome::to(NodeState::Dropped)
        .with_effect(Effect::StopPostgresFast)
        .with_effect(Effect::RemoveLocalState)
}
