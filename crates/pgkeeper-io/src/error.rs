//! I/O error types.

use std::path::PathBuf;

/// Errors from the I/O backend.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Underlying OS I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// File not found after retrying past expected rename windows (§5).
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid file handle (double close, or from a different backend).
    #[error("invalid file handle: {handle}")]
    InvalidHandle { handle: u64 },
}
