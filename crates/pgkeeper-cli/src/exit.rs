//! Stable process exit codes (§6).

/// Every code this binary can return. Stable across releases: scripts and
/// `pg_autoctl`-compatible tooling match on these numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    BadArguments = 12,
    BadConfiguration = 13,
    BadInternalState = 14,
    PgControlFailure = 15,
    MonitorRpcFailure = 16,
    InternalError = 17,
    UserRequestedQuit = 18,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
