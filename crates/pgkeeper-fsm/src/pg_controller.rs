//! Abstraction over local Postgres control (§4.3, §8).
//!
//! Real subprocess/`pg_ctl`/`libpq` control of Postgres is out of scope
//! (§1): this trait is the seam, and tests exercise the FSM against
//! [`InMemoryPgController`] rather than a real cluster.

use std::collections::BTreeMap;
use std::time::Duration;

use pgkeeper_types::{Lsn, TimelineId};

/// Everything the node-active loop needs to observe or drive about the
/// local database.
pub trait PgController: Send {
    /// Initializes a brand-new data directory, creates the replication
    /// role, starts the database (`init → single`).
    fn bootstrap(&mut self) -> Result<(), String>;

    fn start(&mut self) -> Result<(), String>;
    /// Clean shutdown (checkpoint, then stop).
    fn stop_smart(&mut self) -> Result<(), String>;
    /// Immediate shutdown, no checkpoint.
    fn stop_fast(&mut self) -> Result<(), String>;

    fn is_running(&self) -> bool;
    fn is_in_recovery(&self) -> bool;

    /// Promotes a standby in place.
    fn promote(&mut self) -> Result<(), String>;
    /// Disconnects the WAL receiver, if one is active. Gives up and returns
    /// an error once `timeout` elapses without the receiver exiting.
    fn stop_replication(&mut self, timeout: Duration) -> Result<(), String>;
    /// Rewinds against a new primary's timeline and restarts as a standby.
    fn fast_forward(&mut self, target_timeline: TimelineId) -> Result<(), String>;

    /// Current flush LSN and timeline, read from the control file or a
    /// live connection.
    fn current_progress(&self) -> (Lsn, TimelineId);

    fn create_replication_slot(&mut self, slot_name: &str) -> Result<(), String>;
    fn drop_replication_slot(&mut self, slot_name: &str) -> Result<(), String>;
    fn advance_replication_slot(&mut self, slot_name: &str, restart_lsn: Lsn) -> Result<(), String>;
    /// Names of physical replication slots that currently exist.
    fn replication_slots(&self) -> Vec<String>;
    /// The flush LSN the connected standby has acknowledged for this slot,
    /// as seen by the WAL sender; `None` if no standby is currently
    /// streaming on it.
    fn replica_flush_lsn(&self, slot_name: &str) -> Option<Lsn>;

    fn apply_hba(&mut self, entries: &[String]) -> Result<(), String>;
    /// The HBA entries last applied, for diffing against a freshly computed
    /// wanted set.
    fn current_hba_entries(&self) -> Vec<String>;
    fn reload_config(&mut self) -> Result<(), String>;
    fn apply_synchronous_standby_names(&mut self, names: &[String]) -> Result<(), String>;

    /// Blocks until every synchronous standby's reported LSN matches the
    /// primary's current flush position (`primary → prepare_maintenance`).
    fn wait_for_synchronous_standbys_caught_up(&self) -> Result<(), String>;

    /// Removes this node's on-disk state (`* → dropped`, terminal).
    fn remove_local_state(&mut self) -> Result<(), String>;
}

/// An in-memory fake standing in for a real Postgres cluster (§8): used by
/// every FSM test so the dispatch table and node-active loop can be
/// exercised without a real database.
#[derive(Debug, Default)]
pub struct InMemoryPgController {
    pub running: bool,
    pub in_recovery: bool,
    pub lsn: Lsn,
    pub timeline: TimelineId,
    pub slots: BTreeMap<String, Lsn>,
    pub hba_entries: Vec<String>,
    pub reload_count: u32,
    pub synchronous_standby_names: Vec<String>,
    pub bootstrapped: bool,
    /// Test hook: per-slot flush LSN the fake WAL sender should report.
    pub observed_flush_lsns: BTreeMap<String, Lsn>,
    /// Test hook: simulates a WAL receiver that never disconnects, so
    /// `stop_replication` always times out.
    pub wal_receiver_stuck: bool,
}

impl InMemoryPgController {
    pub fn new() -> Self {
        Self {
            timeline: TimelineId::INITIAL,
            ..Self::default()
        }
    }
}

impl PgController for InMemoryPgController {
    fn bootstrap(&mut self) -> Result<(), String> {
        self.bootstrapped = true;
        self.running = true;
        self.in_recovery = false;
        Ok(())
    }

    fn start(&mut self) -> Result<(), String> {
        self.running = true;
        Ok(())
    }

    fn stop_smart(&mut self) -> Result<(), String> {
        self.running = false;
        Ok(())
    }

    fn stop_fast(&mut self) -> Result<(), String> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn is_in_recovery(&self) -> bool {
        self.in_recovery
    }

    fn promote(&mut self) -> Result<(), String> {
        if !self.running {
            return Err("cannot promote a stopped database".to_string());
        }
        self.in_recovery = false;
        self.timeline = self.timeline.next();
        Ok(())
    }

    fn stop_replication(&mut self, timeout: Duration) -> Result<(), String> {
        if self.wal_receiver_stuck {
            return Err(format!("WAL receiver did not exit within {timeout:?}"));
        }
        Ok(())
    }

    fn fast_forward(&mut self, target_timeline: TimelineId) -> Result<(), String> {
        self.timeline = target_timeline;
        self.in_recovery = true;
        self.running = true;
        Ok(())
    }

    fn current_progress(&self) -> (Lsn, TimelineId) {
        (self.lsn, self.timeline)
    }

    fn create_replication_slot(&mut self, slot_name: &str) -> Result<(), String> {
        self.slots.entry(slot_name.to_string()).or_insert(Lsn::ZERO);
        Ok(())
    }

    fn drop_replication_slot(&mut self, slot_name: &str) -> Result<(), String> {
        self.slots.remove(slot_name);
        Ok(())
    }

    fn advance_replication_slot(&mut self, slot_name: &str, restart_lsn: Lsn) -> Result<(), String> {
        match self.slots.get_mut(slot_name) {
            Some(lsn) => {
                *lsn = restart_lsn;
                Ok(())
            }
            None => Err(format!("no such replication slot: {slot_name}")),
        }
    }

    fn replication_slots(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    fn replica_flush_lsn(&self, slot_name: &str) -> Option<Lsn> {
        self.observed_flush_lsns.get(slot_name).copied()
    }

    fn apply_hba(&mut self, entries: &[String]) -> Result<(), String> {
        self.hba_entries = entries.to_vec();
        Ok(())
    }

    fn current_hba_entries(&self) -> Vec<String> {
        self.hba_entries.clone()
    }

    fn reload_config(&mut self) -> Result<(), String> {
        self.reload_count += 1;
        Ok(())
    }

    fn apply_synchronous_standby_names(&mut self, names: &[String]) -> Result<(), String> {
        self.synchronous_standby_names = names.to_vec();
        Ok(())
    }

    fn wait_for_synchronous_standbys_caught_up(&self) -> Result<(), String> {
        Ok(())
    }

    fn remove_local_state(&mut self) -> Result<(), String> {
        self.bootstrapped = false;
        self.slots.clear();
        self.hba_entries.clear();
        Ok(())
    }
}
