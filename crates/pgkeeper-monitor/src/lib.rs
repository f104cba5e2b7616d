//! The monitor assignment engine (§4.5): the authority every keeper's
//! node-active loop reports to and takes its goal state from.
//!
//! `report` holds the per-node/per-group view the engine reasons over.
//! `election` is the pure failover tie-break. `health` is the independent
//! TCP probe job. `assignment::decide` is the pure decision core applying
//! the eight ordered rules. `event`/`notify` are the append-only log and
//! the `state`-channel fan-out. `service` wires a decision round to both.

pub mod assignment;
pub mod election;
pub mod event;
pub mod health;
pub mod notify;
pub mod report;
pub mod service;

pub use assignment::{decide, Assignment, DecisionClock, DEFAULT_ALLOWED_LAG_BYTES};
pub use election::{elect, ElectionResult};
pub use event::{Event, EventLog, InMemoryEventLog};
pub use health::{
    probe_all, probe_once, ProbeTarget, HEALTH_DEADLINE, NODE_ACTIVE_DEADLINE, PROBE_INTERVAL,
    REPORT_LSN_DEADLINE,
};
pub use notify::{NotifyBus, StateChangeEvent};
pub use report::{GroupView, NodeReport};
pub use service::{run_round, GroupStore};
