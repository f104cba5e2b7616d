//! Crash-safe read/write of persistent records (§4.1).

use std::path::Path;

use pgkeeper_io::{FileIo, IoError};
use tracing::{instrument, warn};

use crate::error::StoreError;
use crate::page::{decode_page, encode_page};
use crate::record::Record;

/// Reads and writes pg_keeper's persistent records through a [`FileIo`]
/// backend.
///
/// Every transition that persists a new state must call [`Store::write`]
/// **before** any externally observable side effect: the store is the
/// system's crash consistency boundary (§4.1).
pub struct Store<'a> {
    io: &'a dyn FileIo,
}

impl<'a> Store<'a> {
    pub fn new(io: &'a dyn FileIo) -> Self {
        Self { io }
    }

    /// Reads a record, rejecting schema versions this build doesn't
    /// recognize.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn read<T: Record>(&self, path: &Path) -> Result<T, StoreError> {
        let bytes = match self.io.read_all(path) {
            Ok(bytes) => bytes,
            Err(IoError::NotFound { .. }) => return Err(StoreError::NotFound),
            Err(source) => return Err(StoreError::Io(source)),
        };

        let record: T = decode_page(&bytes)?;
        let found = record.schema_version();
        if !T::ACCEPTED_VERSIONS.contains(&found) {
            warn!(found, expected = ?T::ACCEPTED_VERSIONS, "rejecting record with unrecognized schema version");
            return Err(StoreError::VersionMismatch {
                found,
                expected: T::ACCEPTED_VERSIONS,
            });
        }

        Ok(record)
    }

    /// Writes a record atomically: write to `path.new`, fsync, rename over
    /// `path` (delegated to [`FileIo::write_atomic`]).
    #[instrument(skip(self, record), fields(path = %path.display()))]
    pub fn write<T: Record>(&self, path: &Path, record: &T) -> Result<(), StoreError> {
        let page = encode_page(record)?;
        self.io.write_atomic(path, &page)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pgkeeper_io::SyncBackend;
    use pgkeeper_types::{GroupId, NodeId, NodeState};

    use super::*;
    use crate::record::NodeRecord;

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.state");
        let backend = SyncBackend::new();
        let store = Store::new(&backend);

        let record = NodeRecord::new(NodeId::new(1), GroupId::new(0), NodeState::Init, NodeState::Single);
        store.write(&path, &record).unwrap();

        let read_back: NodeRecord = store.read(&path).unwrap();
        assert_eq!(read_back, record);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.state");
        let backend = SyncBackend::new();
        let store = Store::new(&backend);

        let err = store.read::<NodeRecord>(&path).unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn read_rejects_unrecognized_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.state");
        let backend = SyncBackend::new();
        let store = Store::new(&backend);

        let mut record = NodeRecord::new(NodeId::new(1), GroupId::new(0), NodeState::Init, NodeState::Single);
        record.schema_version = 99;
        store.write(&path, &record).unwrap();

        let err = store.read::<NodeRecord>(&path).unwrap_err();
        assert!(matches!(err, StoreError::VersionMismatch { found: 99, .. }));
    }

    #[test]
    fn write_persists_updated_state_after_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pg_keeper.state");
        let backend = SyncBackend::new();
        let store = Store::new(&backend);

        let mut record = NodeRecord::new(NodeId::new(2), GroupId::new(0), NodeState::Init, NodeState::Single);
        store.write(&path, &record).unwrap();

        record.set_current_state(NodeState::Single);
        store.write(&path, &record).unwrap();

        let read_back: NodeRecord = store.read(&path).unwrap();
        assert_eq!(read_back.current_state(), NodeState::Single);
    }
}
