//! `run` / `stop` / `reload` / `do service` (§4.2, §4.3, §6).
//!
//! `run` would supervise the local Postgres subprocess alongside the
//! node-active loop as a second in-process task. That loop needs a real
//! Postgres controller and a real monitor wire connection, neither of
//! which this build implements (see [`super::monitor_link`]), so `run`
//! fails at that boundary rather than supervising a subprocess nothing
//! will ever reconcile. `stop`/`reload` need no such connection: they
//! just signal an already-running supervisor by its pidfile, which is
//! real.

use pgkeeper_config::Paths;

use crate::error::CliError;

use super::{monitor_link, CommandContext};

const SIGTERM: i32 = 15;
const SIGINT: i32 = 2;
const SIGHUP: i32 = 1;

pub fn run(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("run"))
}

pub fn do_service(ctx: &CommandContext) -> Result<(), CliError> {
    ctx.load_config()?;
    Err(monitor_link::unavailable("do service"))
}

pub fn stop(ctx: &CommandContext, fast: bool) -> Result<(), CliError> {
    signal_supervisor(ctx, if fast { SIGINT } else { SIGTERM })
}

pub fn reload(ctx: &CommandContext) -> Result<(), CliError> {
    signal_supervisor(ctx, SIGHUP)
}

#[allow(unsafe_code)]
fn signal_supervisor(ctx: &CommandContext, signal: i32) -> Result<(), CliError> {
    let paths = Paths::new()?;
    let pidfile_path = paths.pid_file(&ctx.pgdata);

    let contents = std::fs::read_to_string(&pidfile_path).map_err(|error| {
        CliError::BadInternalState(format!("no running supervisor found at {}: {error}", pidfile_path.display()))
    })?;
    let pid: u32 = contents
        .lines()
        .next()
        .and_then(|line| line.trim().parse().ok())
        .ok_or_else(|| CliError::BadInternalState("pidfile is malformed".to_string()))?;

    // SAFETY: `pid` was just read back from our own pidfile, written by a
    // supervisor this binary started.
    let result = unsafe { libc::kill(pid as libc::pid_t, signal) };
    if result != 0 {
        return Err(CliError::PgControlFailure(format!(
            "failed to signal supervisor pid {pid}: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}
