//! Supervisor error types (§4.2, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to spawn service {name:?}: {source}")]
    SpawnFailed {
        name: String,
        source: std::io::Error,
    },

    #[error("service {name:?} not found in pidfile")]
    ServiceNotFound { name: String },

    #[error("pidfile is malformed")]
    PidfileCorrupt,

    #[error(transparent)]
    FileIo(#[from] pgkeeper_io::IoError),
}
