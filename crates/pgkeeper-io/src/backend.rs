//! File I/O backend trait.
//!
//! The [`FileIo`] trait abstracts the handful of file operations the state
//! store needs, so tests can substitute a fault-injecting backend (to
//! exercise P3's crash-safety property) without touching real files.

use std::path::Path;

use crate::IoError;

/// Flags for opening files.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file if it doesn't exist.
    pub create: bool,
    /// Truncate an existing file to zero length on open.
    pub truncate: bool,
}

impl OpenFlags {
    /// Flags for reading an existing file.
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    /// Flags for creating (or truncating) a file for writing.
    pub fn create_truncate() -> Self {
        Self {
            write: true,
            create: true,
            truncate: true,
            ..Self::default()
        }
    }
}

/// Opaque handle to an open file.
///
/// The handle is backend-specific. For [`crate::SyncBackend`], it wraps a
/// `std::fs::File` descriptor. The handle must be closed via [`FileIo::close`].
#[derive(Debug)]
pub struct FileHandle {
    pub(crate) id: u64,
    pub(crate) file: Option<std::fs::File>,
}

impl FileHandle {
    pub(crate) fn from_file(id: u64, file: std::fs::File) -> Self {
        Self {
            id,
            file: Some(file),
        }
    }

    pub(crate) fn file(&self) -> Result<&std::fs::File, IoError> {
        self.file
            .as_ref()
            .ok_or(IoError::InvalidHandle { handle: self.id })
    }

    pub(crate) fn file_mut(&mut self) -> Result<&mut std::fs::File, IoError> {
        self.file
            .as_mut()
            .ok_or(IoError::InvalidHandle { handle: self.id })
    }
}

/// Abstraction over the file operations the state store (§4.1) needs.
///
/// All methods are synchronous: every caller in this workspace already runs
/// its own dedicated OS thread or blocking task (§5), so there is no async
/// I/O requirement here.
pub trait FileIo: Send + Sync {
    /// Opens a file with the given flags.
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<FileHandle, IoError>;

    /// Reads data from a file at the given byte offset. Returns bytes read.
    fn read_at(&self, handle: &FileHandle, offset: u64, buf: &mut [u8]) -> Result<usize, IoError>;

    /// Writes data to a file at the current position. Returns bytes written.
    fn write(&self, handle: &mut FileHandle, buf: &[u8]) -> Result<usize, IoError>;

    /// Syncs file data and metadata to disk.
    fn fsync(&self, handle: &FileHandle) -> Result<(), IoError>;

    /// Closes a file handle.
    fn close(&self, handle: FileHandle) -> Result<(), IoError>;

    /// Reads an entire file into memory. Retries past rename windows per §5:
    /// up to 3 attempts with a 100ms backoff if the file is transiently
    /// missing, before surfacing [`IoError::NotFound`].
    fn read_all(&self, path: &Path) -> Result<Vec<u8>, IoError>;

    /// Writes `data` to `path` atomically: write to `path.new`, fsync, then
    /// rename over `path` (§4.1). Any pre-existing `path.new` is removed
    /// first, so a crash mid-write never leaves a stale temp file blocking
    /// the next attempt.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), IoError>;

    /// Returns the file size in bytes.
    fn file_size(&self, handle: &FileHandle) -> Result<u64, IoError>;
}
