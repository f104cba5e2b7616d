//! Persistent record layouts (§3, §4.1).
//!
//! Every record starts with a `schema_version` field at offset 0 and is
//! plain old data: no pointers, nothing that can't be `memcpy`'d. Records
//! are zero-padded to [`crate::page::PAGE_SIZE`] on disk so a future schema
//! version can grow a record without changing its on-disk footprint.

use pgkeeper_types::{GroupId, NodeId, NodeState};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Current schema version for all record types in this crate.
///
/// A store only accepts this version or an explicitly enumerated prior one
/// (§4.1); anything else is `ErrVersionMismatch`.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A persisted record type: carries its own schema version and the set of
/// versions a reader is willing to accept.
///
/// Readers accept the current version and explicitly enumerated prior
/// versions, never "whatever's in the file" (§4.1) — that's the difference
/// between a real version check and a stub that always returns `true`.
pub trait Record: Serialize + DeserializeOwned {
    /// Versions this build of pg_keeper knows how to read.
    const ACCEPTED_VERSIONS: &'static [u32];

    fn schema_version(&self) -> u32;
}

/// The persistent per-node record: the crash-safe view of
/// `(currentRole, assignedRole, snapshot of local db identity)` (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub schema_version: u32,
    pub node_id: NodeId,
    pub group_id: GroupId,
    current_state_code: u16,
    assigned_state_code: u16,
    pub last_monitor_contact_secs: u64,
    pub last_secondary_contact_secs: u64,
    pub xlog_lag: u64,
    pub is_paused: bool,
    /// Postgres `pg_control`'s system identifier, for sanity-checking that
    /// the data directory on disk is the one this record describes.
    pub system_identifier: u64,
    pub control_version: u32,
    pub catalog_version: u32,
    pub timeline: u32,
}

impl NodeRecord {
    pub fn new(
        node_id: NodeId,
        group_id: GroupId,
        current_state: NodeState,
        assigned_state: NodeState,
    ) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            node_id,
            group_id,
            current_state_code: current_state.code(),
            assigned_state_code: assigned_state.code(),
            last_monitor_contact_secs: 0,
            last_secondary_contact_secs: 0,
            xlog_lag: 0,
            is_paused: false,
            system_identifier: 0,
            control_version: 0,
            catalog_version: 0,
            timeline: 0,
        }
    }

    pub fn current_state(&self) -> NodeState {
        NodeState::from_code(self.current_state_code)
            .expect("record was written by this crate, codes are always valid")
    }

    pub fn assigned_state(&self) -> NodeState {
        NodeState::from_code(self.assigned_state_code)
            .expect("record was written by this crate, codes are always valid")
    }

    pub fn set_current_state(&mut self, state: NodeState) {
        self.current_state_code = state.code();
    }

    pub fn set_assigned_state(&mut self, state: NodeState) {
        self.assigned_state_code = state.code();
    }
}

impl Record for NodeRecord {
    const ACCEPTED_VERSIONS: &'static [u32] = &[CURRENT_SCHEMA_VERSION];

    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// What was found on disk at first launch (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialDiskState {
    PgdataEmpty,
    PgdataExists,
    PostgresRunning,
    PostgresIsPrimary,
}

/// Written once at bootstrap; consulted by transitions that must behave
/// differently on a brand-new versus pre-existing database (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRecord {
    pub schema_version: u32,
    pub disk_state: InitialDiskState,
}

impl InitRecord {
    pub fn new(disk_state: InitialDiskState) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            disk_state,
        }
    }
}

impl Record for InitRecord {
    const ACCEPTED_VERSIONS: &'static [u32] = &[CURRENT_SCHEMA_VERSION];

    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// The supervisor's local view of whether the database should currently be
/// running (§3). Set by FSM transitions, read by the database controller
/// loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PgExpectation {
    Running,
    RunningAsSubprocess,
    Stopped,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgExpectationRecord {
    pub schema_version: u32,
    pub expectation: PgExpectation,
}

impl PgExpectationRecord {
    pub fn new(expectation: PgExpectation) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            expectation,
        }
    }
}

impl Record for PgExpectationRecord {
    const ACCEPTED_VERSIONS: &'static [u32] = &[CURRENT_SCHEMA_VERSION];

    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}
