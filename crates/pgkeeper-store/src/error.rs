//! Store error types (§4.1, §7).

use thiserror::Error;

/// Errors surfaced by reading or writing a persistent record.
///
/// Maps directly to the taxonomy in §7: state-file errors are fatal, the
/// operator must roll back or re-run `create`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record is corrupt: {reason}")]
    Corrupt { reason: String },

    #[error("schema version mismatch: found {found}, expected one of {expected:?}")]
    VersionMismatch { found: u32, expected: &'static [u32] },

    #[error("no record at this path yet")]
    NotFound,

    #[error("record does not fit in one page: {size} bytes")]
    RecordTooLarge { size: usize },

    #[error("failed to encode record: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] pgkeeper_io::IoError),
}
