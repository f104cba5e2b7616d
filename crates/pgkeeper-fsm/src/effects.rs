//! Effects a transition asks the imperative shell to carry out.
//!
//! The dispatch table (§4.3) is pure: it never touches Postgres, the
//! filesystem, or the network itself. Each handler returns a list of
//! [`Effect`]s describing what must happen for the transition to be
//! considered complete; [`crate::pg_controller::PgController`] carries them
//! out and the caller re-checks postconditions afterward.

use std::time::Duration;

use pgkeeper_types::{PeerNode, TimelineId};

/// Something the node-active loop must do to realize a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// First-time `initdb`, replication role and database creation, start.
    Bootstrap,
    /// `pg_ctl start` (or equivalent) the local database.
    StartPostgres,
    /// Stop the local database, allowing a clean shutdown checkpoint.
    StopPostgresSmart,
    /// Stop the local database immediately (maintenance, drop).
    StopPostgresFast,
    /// Promote a standby in place (`pg_ctl promote`).
    PromoteInPlace,
    /// Disconnect the WAL receiver so the promotion target stops following
    /// the old primary (`pg_promote`'s effect on the replica side), bounded
    /// by `prepare_promotion_walreceiver`.
    StopReplication { timeout: Duration },
    /// Rewind the local timeline to follow the new primary
    /// (`pg_rewind`/`pg_basebackup` equivalent).
    FastForward { target_timeline: TimelineId },
    /// Create a physical replication slot for a newly visible peer.
    CreateReplicationSlot { peer: PeerNode },
    /// Drop a replication slot for a peer no longer in the known-nodes list.
    DropReplicationSlot { slot_name: String },
    /// Advance a replication slot's `restart_lsn` to match reported progress.
    AdvanceReplicationSlot { slot_name: String, restart_lsn: pgkeeper_types::Lsn },
    /// Rewrite `pg_hba.conf` to match the current known-nodes list.
    ApplyHba { entries: Vec<PeerNode> },
    /// `pg_ctl reload` after a configuration change (HBA or GUC).
    ReloadPostgresConfig,
    /// Apply a changed `number_sync_standbys` / `synchronous_standby_names`.
    ApplySynchronousStandbyNames { names: Vec<String> },
    /// Block until every synchronous standby's reported LSN matches the
    /// primary's, per the `prepare_maintenance` handler contract.
    EnsureSynchronousStandbysCaughtUp,
    /// Remove this node's on-disk state files (terminal, `dropped`).
    RemoveLocalState,
}
