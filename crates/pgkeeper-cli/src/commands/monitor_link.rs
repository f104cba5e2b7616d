//! The live monitor wire connection (§4.4).
//!
//! `MonitorTransport` is the seam every RPC in this binary goes through;
//! the FSM's `PgController` is the same kind of seam for local Postgres
//! control. Neither has a concrete, network- or subprocess-backed
//! implementation in this build — only the in-memory fakes the test
//! suites drive them with. Real wire/`libpq` plumbing is out of scope
//! (§1), so every command that would need a live connection calls through
//! here instead of constructing a fake one and pretending it worked.

use crate::error::CliError;

/// Returns the error a command reports when it needs a live monitor
/// connection this build doesn't have.
pub fn unavailable(operation: &str) -> CliError {
    CliError::MonitorRpc(pgkeeper_client::ClientError::Transport(format!(
        "{operation} requires a live connection to the monitor, which this build does not implement"
    )))
}
