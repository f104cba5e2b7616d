//! Persistent record storage for pg_keeper (§3, §4.1).
//!
//! Every local node keeps four small records on disk: the per-node state
//! record, the init-state record, the postgres-expectation record, and
//! (outside this crate's concern) a cached peer list. Each is a fixed-size,
//! zero-padded page written through [`pgkeeper_io::FileIo::write_atomic`],
//! so a crash mid-write never leaves a half-written record behind — the
//! reader either sees the old page or the new one, never a mix.

mod error;
mod page;
mod record;
mod store;

pub use error::StoreError;
pub use page::PAGE_SIZE;
pub use record::{
    CURRENT_SCHEMA_VERSION, InitRecord, InitialDiskState, NodeRecord, PgExpectation,
    PgExpectationRecord, Record,
};
pub use store::Store;

static_assertions::const_assert!(core::mem::size_of::<NodeRecord>() <= PAGE_SIZE);
static_assertions::const_assert!(core::mem::size_of::<InitRecord>() <= PAGE_SIZE);
static_assertions::const_assert!(core::mem::size_of::<PgExpectationRecord>() <= PAGE_SIZE);
