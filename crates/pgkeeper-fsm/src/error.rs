//! Errors produced by the local node FSM (§4.3).

/// Failures arising from dispatching or executing a local node transition.
#[derive(Debug, thiserror::Error)]
pub enum FsmError {
    /// No handler registered for this `(current, assigned)` pair. Per P2,
    /// every reachable pair must be in the table; reaching this is a
    /// protocol-level bug, not an operational condition to recover from.
    #[error("no transition handler for (current={current}, assigned={assigned})")]
    UnhandledTransition {
        current: pgkeeper_types::NodeState,
        assigned: pgkeeper_types::NodeState,
    },

    /// A transition's postcondition did not hold after the controller
    /// reported success (e.g. `promote` returned but the node is still a
    /// standby).
    #[error("postcondition failed for transition into {expected}: {reason}")]
    PostconditionFailed {
        expected: pgkeeper_types::NodeState,
        reason: String,
    },

    /// The local Postgres controller failed to execute a requested effect.
    #[error("postgres controller error: {0}")]
    Controller(String),

    /// The monitor link (registration/heartbeat RPC) failed.
    #[error("monitor link error: {0}")]
    MonitorLink(String),

    #[error(transparent)]
    Store(#[from] pgkeeper_store::StoreError),

    #[error(transparent)]
    Io(#[from] pgkeeper_io::IoError),
}
