//! Local node FSM (§4.3): a pure dispatch table over `(current, assigned)`
//! state pairs, paired with an async imperative shell that drives it
//! against a real Postgres installation and the monitor.

pub mod context;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod hba;
pub mod node_active;
pub mod pg_controller;
pub mod recovery;
pub mod replication_slots;
pub mod transitions;

pub use context::{TransitionContext, TransitionOutcome};
pub use dispatch::DispatchTable;
pub use effects::Effect;
pub use error::FsmError;
pub use node_active::{run_cycle, MonitorLink, NodeActiveReport, NODE_ACTIVE_INTERVAL};
pub use pg_controller::{InMemoryPgController, PgController};
