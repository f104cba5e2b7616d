//! Command errors and their exit codes (§6, §7).

use crate::exit::ExitCode;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    BadArguments(String),

    #[error(transparent)]
    Config(#[from] pgkeeper_config::ConfigError),

    #[error(transparent)]
    Store(#[from] pgkeeper_store::StoreError),

    #[error("{0}")]
    BadInternalState(String),

    #[error("{0}")]
    PgControlFailure(String),

    #[error("monitor RPC failed: {0}")]
    MonitorRpc(#[from] pgkeeper_client::ClientError),

    #[error("{0}")]
    Internal(String),

    #[error("quit requested by operator")]
    UserRequestedQuit,
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::BadArguments(_) => ExitCode::BadArguments,
            CliError::Config(_) => ExitCode::BadConfiguration,
            CliError::Store(_) => ExitCode::BadInternalState,
            CliError::BadInternalState(_) => ExitCode::BadInternalState,
            CliError::PgControlFailure(_) => ExitCode::PgControlFailure,
            CliError::MonitorRpc(_) => ExitCode::MonitorRpcFailure,
            CliError::Internal(_) => ExitCode::InternalError,
            CliError::UserRequestedQuit => ExitCode::UserRequestedQuit,
        }
    }
}
