//! Errors surfaced by the monitor client (§4.4).

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("node is already registered")]
    AlreadyRegistered,

    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error("node not found")]
    NotFound,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}
