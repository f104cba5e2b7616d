//! Synchronous I/O backend using `std::fs`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use crate::IoError;
use crate::backend::{FileHandle, FileIo, OpenFlags};

/// Number of times [`SyncBackend::read_all`] retries a missing file before
/// giving up (§5: "readers tolerate a missing target... to bridge rename
/// windows").
const READ_RETRY_ATTEMPTS: u32 = 3;
const READ_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Synchronous I/O backend using `std::fs::File`.
#[derive(Debug)]
pub struct SyncBackend {
    next_handle_id: AtomicU64,
}

impl SyncBackend {
    pub fn new() -> Self {
        Self {
            next_handle_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_handle_id.fetch_add(1, Ordering::Relaxed)
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_owned();
        os.push(".new");
        PathBuf::from(os)
    }
}

impl Default for SyncBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FileIo for SyncBackend {
    fn open(&self, path: &Path, flags: OpenFlags) -> Result<FileHandle, IoError> {
        let mut opts = OpenOptions::new();

        if flags.read {
            opts.read(true);
        }
        if flags.write {
            opts.write(true);
        }
        if flags.create {
            opts.create(true);
        }
        if flags.truncate {
            opts.truncate(true);
        }

        let file = opts.open(path)?;
        let id = self.next_id();
        Ok(FileHandle::from_file(id, file))
    }

    fn read_at(&self, handle: &FileHandle, offset: u64, buf: &mut [u8]) -> Result<usize, IoError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            let file = handle.file()?;
            let n = file.read_at(buf, offset)?;
            Ok(n)
        }

        #[cfg(not(unix))]
        {
            use std::os::windows::fs::FileExt;
            let file = handle.file()?;
            let n = file.seek_read(buf, offset)?;
            Ok(n)
        }
    }

    fn write(&self, handle: &mut FileHandle, buf: &[u8]) -> Result<usize, IoError> {
        let file = handle.file_mut()?;
        let n = file.write(buf)?;
        Ok(n)
    }

    fn fsync(&self, handle: &FileHandle) -> Result<(), IoError> {
        handle.file()?.sync_all()?;
        Ok(())
    }

    fn close(&self, mut handle: FileHandle) -> Result<(), IoError> {
        handle.file = None;
        Ok(())
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>, IoError> {
        let mut last_err = None;
        for attempt in 0..READ_RETRY_ATTEMPTS {
            match fs::read(path) {
                Ok(data) => return Ok(data),
                Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                    last_err = Some(source);
                    if attempt + 1 < READ_RETRY_ATTEMPTS {
                        thread::sleep(READ_RETRY_BACKOFF);
                    }
                }
                Err(source) => return Err(IoError::from(source)),
            }
        }
        let _ = last_err;
        Err(IoError::NotFound {
            path: path.to_path_buf(),
        })
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), IoError> {
        let tmp = Self::temp_path(path);

        // A crash between a previous write and its rename can leave a stale
        // `path.new`; remove it before writing the fresh one (§4.1).
        if tmp.exists() {
            fs::remove_file(&tmp)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn file_size(&self, handle: &FileHandle) -> Result<u64, IoError> {
        let metadata = handle.file()?.metadata()?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_then_read_all_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        let backend = SyncBackend::new();

        backend.write_atomic(&path, b"hello world").unwrap();
        assert_eq!(backend.read_all(&path).unwrap(), b"hello world");
        assert!(!SyncBackend::temp_path(&path).exists(), "temp file must be renamed away");
    }

    #[test]
    fn write_atomic_removes_stale_temp_file_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        let backend = SyncBackend::new();

        fs::write(SyncBackend::temp_path(&path), b"stale partial write").unwrap();
        backend.write_atomic(&path, b"fresh").unwrap();

        assert_eq!(backend.read_all(&path).unwrap(), b"fresh");
    }

    #[test]
    fn write_atomic_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        let backend = SyncBackend::new();

        backend.write_atomic(&path, b"first").unwrap();
        backend.write_atomic(&path, b"second, longer payload").unwrap();

        assert_eq!(backend.read_all(&path).unwrap(), b"second, longer payload");
    }

    #[test]
    fn read_all_missing_file_eventually_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.dat");
        let backend = SyncBackend::new();

        let err = backend.read_all(&path).unwrap_err();
        assert!(matches!(err, IoError::NotFound { .. }));
    }

    #[test]
    fn read_at_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offsets.dat");
        let backend = SyncBackend::new();

        backend.write_atomic(&path, b"0123456789").unwrap();

        let handle = backend.open(&path, OpenFlags::read_only()).unwrap();
        let mut buf = [0u8; 5];
        let n = backend.read_at(&handle, 3, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"34567");
        backend.close(handle).unwrap();
    }

    #[test]
    fn file_size_reports_written_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sized.dat");
        let backend = SyncBackend::new();

        backend.write_atomic(&path, b"twelve bytes").unwrap();

        let handle = backend.open(&path, OpenFlags::read_only()).unwrap();
        assert_eq!(backend.file_size(&handle).unwrap(), 12);
        backend.close(handle).unwrap();
    }
}
