//! # pg_keeper
//!
//! An automated Postgres failover control plane modeled on
//! `pg_auto_failover`: a monitor decides each group's roles from node
//! health and replication progress, and a keeper process on every node
//! drives its local Postgres toward whatever role the monitor assigns.
//!
//! This crate is a facade over the workspace's per-concern crates; it
//! exists for embedders and integration tests that want the whole
//! surface under one name. The `pg_keeper` binary (see `pgkeeper-cli`)
//! is the entry point operators actually run.
//!
//! # Architecture
//!
//! ```text
//! create/show/perform (pgkeeper-cli)
//!           |
//!           v
//!   pgkeeper-config, pgkeeper-store   <- on-disk state for one node
//!           |
//!           v
//!   pgkeeper-fsm (node_active loop) <---> pgkeeper-client <---> monitor
//!           |                                                      |
//!           v                                                      v
//!   Postgres (via PgController)                         pgkeeper-monitor
//!                                                        (assignment engine)
//!
//!   pgkeeper-supervisor runs the keeper's subprocesses; pgkeeper-io and
//!   pgkeeper-types underlie the crates above.
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use pg_keeper::{KeeperConfig, Paths};
//!
//! let pgdata = std::path::Path::new("/var/lib/postgresql/16/main");
//! let config = KeeperConfig::load(pgdata)?;
//! let paths = Paths::new()?;
//! println!("state file: {}", paths.state_file(pgdata).display());
//! # Ok::<(), pg_keeper::ConfigError>(())
//! ```

pub use pgkeeper_client::{
    register, ClientError, InMemoryMonitorTransport, MonitorClient, MonitorTransport,
    NodeActiveRequest, NodeActiveResponse, NodeStateRow, RetryPolicy, StateChangeNotification,
};
pub use pgkeeper_config::{
    ConfigError, ConfigLoader, HbaLevel, KeeperConfig, KeeperSection, Paths, PostgresqlSection,
    ReplicationSection, Role, SslSection, TimeoutSection,
};
pub use pgkeeper_fsm::{
    run_cycle, DispatchTable, Effect, FsmError, InMemoryPgController, MonitorLink,
    NodeActiveReport, PgController, TransitionContext, TransitionOutcome, NODE_ACTIVE_INTERVAL,
};
pub use pgkeeper_io::{FileHandle, FileIo, IoError, OpenFlags, SyncBackend};
pub use pgkeeper_monitor::{
    decide, elect, probe_all, probe_once, run_round, Assignment, DecisionClock, ElectionResult,
    Event, EventLog, GroupStore, GroupView, InMemoryEventLog, NodeReport, NotifyBus, ProbeTarget,
    StateChangeEvent, DEFAULT_ALLOWED_LAG_BYTES, HEALTH_DEADLINE, NODE_ACTIVE_DEADLINE,
    PROBE_INTERVAL, REPORT_LSN_DEADLINE,
};
pub use pgkeeper_store::{
    InitRecord, InitialDiskState, NodeRecord, PgExpectation, PgExpectationRecord, Record, Store,
    StoreError, CURRENT_SCHEMA_VERSION, PAGE_SIZE,
};
pub use pgkeeper_supervisor::{
    Pidfile, RestartBudget, RestartPolicy, ServiceSpec, Supervisor, SupervisorError,
    SupervisorExit, SupervisorSignal,
};
pub use pgkeeper_types::{
    CandidatePriority, FormationName, FormationSettings, GroupId, Health, Lsn, NodeId,
    NodeIdentity, NodeKind, NodeState, ParseNodeStateError, PeerNode, ReplicationProgress,
    TimelineId, Timestamp,
};
