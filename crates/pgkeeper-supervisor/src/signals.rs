//! Bridges POSIX signals into the async supervisor loop (§4.2).
//!
//! `signal-hook` delivers signals on its own dedicated thread; we forward
//! them across an unbounded channel so the supervisor can `select!` on
//! signals alongside its reconciliation tick.

use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use tokio::sync::mpsc;

use crate::error::SupervisorError;

/// A supervisor-level signal event, already mapped from the raw POSIX
/// signal to its meaning (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorSignal {
    /// `SIGHUP`: broadcast reload to every child.
    Reload,
    /// `SIGTERM`: begin smart shutdown.
    SmartShutdown,
    /// `SIGINT`: begin fast shutdown.
    FastShutdown,
    /// `SIGQUIT`: immediate `SIGKILL` to children and exit, regardless of
    /// any shutdown phase already in progress.
    Kill,
}

/// Installs handlers for `SIGHUP`/`SIGTERM`/`SIGINT`/`SIGQUIT` and returns
/// a receiver the supervisor loop can poll.
pub fn install() -> Result<mpsc::UnboundedReceiver<SupervisorSignal>, SupervisorError> {
    let mut signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for signal in signals.forever() {
            let event = match signal {
                SIGHUP => SupervisorSignal::Reload,
                SIGTERM => SupervisorSignal::SmartShutdown,
                SIGINT => SupervisorSignal::FastShutdown,
                SIGQUIT => SupervisorSignal::Kill,
                _ => continue,
            };
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}
